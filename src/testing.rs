//! Test support: graph generation, structural comparison and cleanup.

use std::ops::Range;

use quickcheck::{Arbitrary, Gen};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing_subscriber::EnvFilter;

use crate::options::KeyPolicy;
use crate::registry::Identity;
use crate::value::{
  Array, Date, Function, Map, Object, Opaque, Set, Symbol, Value,
};

pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_test_writer()
    .try_init();
}

// ============================================================================
// Walking
// ============================================================================

fn children(value: &Value) -> Vec<Value> {
  match value {
    Value::Array(a) => a.to_vec(),
    Value::Map(m) => m.entries().into_iter().map(|(_, v)| v).collect(),
    Value::Set(s) => s.values(),
    Value::Object(o) => {
      o.own_properties().into_iter().map(|(_, p)| p.value).collect()
    },
    _ => vec![],
  }
}

/// Every tracked value reachable from `root` through container contents.
/// Map keys and prototypes are not followed.
pub fn reachable(root: &Value) -> Vec<Value> {
  let mut seen: FxHashSet<Identity> = FxHashSet::default();
  let mut out = Vec::new();
  let mut stack = vec![root.clone()];
  while let Some(v) = stack.pop() {
    let Some(id) = v.identity() else { continue };
    if !seen.insert(id) {
      continue;
    }
    stack.extend(children(&v));
    out.push(v);
  }
  out
}

/// Changes every container reachable from `root`.
pub fn mutate_all(root: &Value) {
  for v in reachable(root) {
    match &v {
      Value::Array(a) => a.push(Value::str("mutated")),
      Value::Map(m) => {
        m.insert(Value::str("mutated"), Value::Null);
      },
      Value::Set(s) => {
        s.insert(Value::str("mutated"));
      },
      Value::Object(o) => o.set("mutated", Value::Null),
      Value::Date(d) => d.set_instant(None),
      _ => {},
    }
  }
}

/// Empties every container reachable from `root` so `Rc` cycles are freed.
pub fn sever(root: &Value) {
  for v in reachable(root) {
    match &v {
      Value::Array(a) => a.clear(),
      Value::Map(m) => m.clear(),
      Value::Set(s) => s.clear(),
      Value::Object(o) => o.clear(),
      _ => {},
    }
  }
}

// ============================================================================
// Isomorphism
// ============================================================================

fn same_leaf(a: &Value, b: &Value) -> bool {
  match (a, b) {
    (Value::Number(x), Value::Number(y)) => {
      (x.is_nan() && y.is_nan()) || x.to_bits() == y.to_bits()
    },
    _ => a.same(b),
  }
}

/// Checks that `copy` has the shape of `orig` over tracked values, shares
/// every atomic leaf, preserves sharing and cycles, and shares no tracked
/// value with `orig`.
pub fn check_isomorphic(
  orig: &Value,
  copy: &Value,
  keys: KeyPolicy,
) -> Result<(), String> {
  let mut forward: FxHashMap<Identity, Identity> = FxHashMap::default();
  let mut backward: FxHashMap<Identity, Identity> = FxHashMap::default();
  let mut stack = vec![(orig.clone(), copy.clone())];

  while let Some((o, c)) = stack.pop() {
    if o.category() != c.category() {
      return Err(format!("category mismatch: {o:?} vs {c:?}"));
    }
    let (oid, cid) = match (o.identity(), c.identity()) {
      (None, None) => {
        if !same_leaf(&o, &c) {
          return Err(format!("leaf not shared: {o:?} vs {c:?}"));
        }
        continue;
      },
      (Some(oid), Some(cid)) => (oid, cid),
      _ => return Err(format!("identity mismatch: {o:?} vs {c:?}")),
    };
    match forward.get(&oid).copied() {
      Some(mapped) if mapped == cid => continue,
      Some(mapped) => {
        return Err(format!("{o:?} cloned twice: {mapped:?} and {cid:?}"));
      },
      None => {
        if let Some(other) = backward.get(&cid) {
          return Err(format!("{c:?} is the clone of {other:?} and {oid:?}"));
        }
        forward.insert(oid, cid);
        backward.insert(cid, oid);
      },
    }

    match (&o, &c) {
      (Value::Date(a), Value::Date(b)) => {
        if a.instant() != b.instant() {
          return Err(format!("instant differs: {a:?} vs {b:?}"));
        }
      },
      (Value::Array(a), Value::Array(b)) => {
        let (xs, ys) = (a.to_vec(), b.to_vec());
        if xs.len() != ys.len() {
          return Err(format!("length differs: {a:?} vs {b:?}"));
        }
        stack.extend(xs.into_iter().zip(ys));
      },
      (Value::Map(a), Value::Map(b)) => {
        let (xs, ys) = (a.entries(), b.entries());
        if xs.len() != ys.len() {
          return Err(format!("size differs: {a:?} vs {b:?}"));
        }
        for ((ok, ov), (ck, cv)) in xs.into_iter().zip(ys) {
          match keys {
            KeyPolicy::ByReference => {
              if !same_leaf(&ok, &ck) {
                return Err(format!("key not shared: {ok:?} vs {ck:?}"));
              }
            },
            KeyPolicy::Deep => stack.push((ok, ck)),
          }
          stack.push((ov, cv));
        }
      },
      (Value::Set(a), Value::Set(b)) => {
        let (xs, ys) = (a.values(), b.values());
        if xs.len() != ys.len() {
          return Err(format!("size differs: {a:?} vs {b:?}"));
        }
        stack.extend(xs.into_iter().zip(ys));
      },
      (Value::Object(a), Value::Object(b)) => {
        let proto_ok = match (a.prototype(), b.prototype()) {
          (None, None) => true,
          (Some(x), Some(y)) => x.ptr_eq(&y),
          _ => false,
        };
        if !proto_ok {
          return Err(format!("prototype not shared: {a:?} vs {b:?}"));
        }
        let (xs, ys) = (a.own_properties(), b.own_properties());
        if xs.len() != ys.len() {
          return Err(format!("property count differs: {a:?} vs {b:?}"));
        }
        for ((ok, op), (ck, cp)) in xs.into_iter().zip(ys) {
          if ok != ck || op.enumerable != cp.enumerable {
            return Err(format!("property differs: {ok:?} vs {ck:?}"));
          }
          stack.push((op.value, cp.value));
        }
      },
      _ => return Err(format!("unexpected pair: {o:?} vs {c:?}")),
    }
  }

  match backward.keys().find(|cid| forward.contains_key(cid)) {
    Some(cid) => Err(format!("{cid:?} is shared by original and clone")),
    None => Ok(()),
  }
}

pub fn assert_isomorphic(orig: &Value, copy: &Value, keys: KeyPolicy) {
  if let Err(e) = check_isomorphic(orig, copy, keys) {
    panic!("clone is not isomorphic: {e}");
  }
}

// ============================================================================
// Generation
// ============================================================================

pub fn gen_range(g: &mut Gen, range: Range<usize>) -> usize {
  let res: usize = Arbitrary::arbitrary(g);
  if range.is_empty() {
    range.start
  } else {
    (res % (range.end - range.start)) + range.start
  }
}

pub fn next_case<A: Copy>(g: &mut Gen, gens: &[(usize, A)]) -> A {
  let sum: usize = gens.iter().map(|x| x.0).sum();
  let mut weight: usize = gen_range(g, 1..sum + 1);
  for (n, case) in gens {
    if *n == 0 {
      continue;
    }
    match weight.checked_sub(*n) {
      None | Some(0) => return *case,
      _ => weight -= *n,
    }
  }
  gens[gens.len() - 1].1
}

#[derive(Debug, Clone, Copy)]
pub enum NodeKind {
  Array,
  Map,
  Set,
  Object,
  Date,
}

#[derive(Debug, Clone, Copy)]
enum LeafCase {
  Undefined,
  Null,
  Bool,
  Number,
  Str,
  Symbol,
  Function,
  Opaque,
}

#[derive(Debug, Clone)]
pub enum Leaf {
  Undefined,
  Null,
  Bool(bool),
  Number(f64),
  Str(String),
  Symbol(usize),
  Function(usize),
  Opaque,
}

#[derive(Debug, Clone)]
pub enum Edge {
  Node(usize),
  Leaf(Leaf),
}

#[derive(Debug, Clone)]
pub struct NodePlan {
  pub kind: NodeKind,
  pub children: Vec<Edge>,
  pub proto: Option<usize>,
  pub millis: i64,
}

/// Blueprint of a value graph. Node 0 is the root; edges may point at any
/// node, so plans describe shared and cyclic structure freely.
#[derive(Debug, Clone)]
pub struct GraphPlan {
  pub nodes: Vec<NodePlan>,
}

fn arbitrary_leaf(g: &mut Gen) -> Leaf {
  let case = next_case(
    g,
    &[
      (1, LeafCase::Undefined),
      (1, LeafCase::Null),
      (2, LeafCase::Bool),
      (4, LeafCase::Number),
      (4, LeafCase::Str),
      (2, LeafCase::Symbol),
      (1, LeafCase::Function),
      (1, LeafCase::Opaque),
    ],
  );
  match case {
    LeafCase::Undefined => Leaf::Undefined,
    LeafCase::Null => Leaf::Null,
    LeafCase::Bool => Leaf::Bool(Arbitrary::arbitrary(g)),
    LeafCase::Number => Leaf::Number(Arbitrary::arbitrary(g)),
    LeafCase::Str => Leaf::Str(Arbitrary::arbitrary(g)),
    LeafCase::Symbol => Leaf::Symbol(gen_range(g, 0..2)),
    LeafCase::Function => Leaf::Function(gen_range(g, 0..2)),
    LeafCase::Opaque => Leaf::Opaque,
  }
}

fn arbitrary_node(g: &mut Gen, n: usize) -> NodePlan {
  let kind = next_case(
    g,
    &[
      (3, NodeKind::Array),
      (2, NodeKind::Map),
      (2, NodeKind::Set),
      (3, NodeKind::Object),
      (1, NodeKind::Date),
    ],
  );
  let len = match kind {
    NodeKind::Date => 0,
    _ => gen_range(g, 0..6),
  };
  let children = (0..len)
    .map(|_| {
      if bool::arbitrary(g) {
        Edge::Node(gen_range(g, 0..n))
      } else {
        Edge::Leaf(arbitrary_leaf(g))
      }
    })
    .collect();
  let proto = bool::arbitrary(g).then(|| gen_range(g, 0..n));
  let millis = (gen_range(g, 0..4_000_000) as i64) * 1_000_000;
  NodePlan { kind, children, proto, millis }
}

impl Arbitrary for GraphPlan {
  fn arbitrary(g: &mut Gen) -> Self {
    let n = gen_range(g, 1..9);
    GraphPlan { nodes: (0..n).map(|_| arbitrary_node(g, n)).collect() }
  }
}

impl GraphPlan {
  /// Materializes the plan and returns its root.
  pub fn build(&self) -> Value {
    let symbols = [Symbol::new("a"), Symbol::new("b")];
    let functions = [
      Function::new("f", |_| Value::Undefined),
      Function::new("g", |args| args.first().cloned().unwrap_or(Value::Null)),
    ];
    let opaque = Opaque::new("handle", 0u8);
    let nodes: Vec<Value> = self
      .nodes
      .iter()
      .map(|plan| match plan.kind {
        NodeKind::Array => Value::from(Array::new()),
        NodeKind::Map => Value::from(Map::new()),
        NodeKind::Set => Value::from(Set::new()),
        NodeKind::Object => Value::from(Object::new()),
        NodeKind::Date => Value::from(Date::from_timestamp_millis(plan.millis)),
      })
      .collect();
    let edge = |e: &Edge| match e {
      Edge::Node(i) => nodes[*i].clone(),
      Edge::Leaf(Leaf::Undefined) => Value::Undefined,
      Edge::Leaf(Leaf::Null) => Value::Null,
      Edge::Leaf(Leaf::Bool(b)) => Value::from(*b),
      Edge::Leaf(Leaf::Number(x)) => Value::from(*x),
      Edge::Leaf(Leaf::Str(s)) => Value::from(s.as_str()),
      Edge::Leaf(Leaf::Symbol(i)) => Value::from(symbols[*i].clone()),
      Edge::Leaf(Leaf::Function(i)) => Value::from(functions[*i].clone()),
      Edge::Leaf(Leaf::Opaque) => Value::from(opaque.clone()),
    };

    for (plan, node) in self.nodes.iter().zip(&nodes) {
      match node {
        Value::Array(a) => {
          for e in &plan.children {
            a.push(edge(e));
          }
        },
        Value::Map(m) => {
          for (j, e) in plan.children.iter().enumerate() {
            let key = if j % 3 == 2 {
              nodes[(j * 7 + 1) % nodes.len()].clone()
            } else {
              Value::from(format!("k{j}"))
            };
            m.insert(key, edge(e));
          }
        },
        Value::Set(s) => {
          for e in &plan.children {
            s.insert(edge(e));
          }
        },
        Value::Object(o) => {
          for (j, e) in plan.children.iter().enumerate() {
            if j == 3 {
              o.set(&symbols[0], edge(e));
            } else {
              o.define(format!("p{j}"), edge(e), j % 2 == 0);
            }
          }
          if let Some(p) = plan.proto
            && let Value::Object(proto) = &nodes[p]
          {
            o.set_prototype(Some(proto.clone()));
          }
        },
        _ => {},
      }
    }
    nodes[0].clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cloner::{Cloner, deep_copy, deep_copy_all};
  use crate::options::CloneOptions;
  use proptest::{collection::vec, prelude::*};

  fn report(result: Result<(), String>) -> bool {
    match result {
      Ok(()) => true,
      Err(e) => {
        println!("err: {e}");
        false
      },
    }
  }

  #[quickcheck]
  fn prop_clone_is_isomorphic(plan: GraphPlan) -> bool {
    init_tracing();
    let orig = plan.build();
    let ok = match deep_copy(&orig) {
      Ok(copy) => {
        let ok = report(check_isomorphic(&orig, &copy, KeyPolicy::ByReference));
        sever(&copy);
        ok
      },
      Err(e) => report(Err(e.to_string())),
    };
    sever(&orig);
    ok
  }

  #[quickcheck]
  fn prop_deep_keys_are_isomorphic(plan: GraphPlan) -> bool {
    let orig = plan.build();
    let opts = CloneOptions::new().with_key_policy(KeyPolicy::Deep);
    let ok = match Cloner::new(opts).clone_value(&orig) {
      Ok(copy) => {
        let ok = report(check_isomorphic(&orig, &copy, KeyPolicy::Deep));
        sever(&copy);
        ok
      },
      Err(e) => report(Err(e.to_string())),
    };
    sever(&orig);
    ok
  }

  #[quickcheck]
  fn prop_mutations_do_not_cross(plan: GraphPlan) -> bool {
    let orig = plan.build();
    let Ok(copies) = deep_copy_all(&[orig.clone()]) else { return false };
    let Ok(witness) = deep_copy(&orig) else { return false };
    let Ok(witness2) = deep_copy(&witness) else { return false };
    let copy = &copies[0];

    mutate_all(copy);
    let untouched = report(check_isomorphic(&orig, &witness, KeyPolicy::ByReference));
    mutate_all(&orig);
    let still = report(check_isomorphic(&witness, &witness2, KeyPolicy::ByReference));

    for v in [&orig, copy, &witness, &witness2] {
      sever(v);
    }
    untouched && still
  }

  #[quickcheck]
  fn prop_registry_counts_tracked_values(plan: GraphPlan) -> bool {
    let orig = plan.build();
    let tracked = reachable(&orig).len();
    let mut cloner = Cloner::default();
    let ok = match cloner.clone_value(&orig) {
      Ok(copy) => {
        let ok = cloner.registry().len() == tracked;
        sever(&copy);
        ok
      },
      Err(_) => false,
    };
    drop(cloner);
    sever(&orig);
    ok
  }

  #[test]
  fn checker_rejects_shallow_copies() {
    let inner = Value::from(Array::from_values([Value::from(1)]));
    let orig = Value::from(Array::from_values([inner.clone()]));
    let shallow = Value::from(Array::from_values([inner]));
    assert!(check_isomorphic(&orig, &shallow, KeyPolicy::ByReference).is_err());
  }

  #[test]
  fn checker_rejects_lost_sharing() {
    let shared = Value::from(Object::new());
    let orig = Value::from(Array::from_values([shared.clone(), shared]));
    let split = Value::from(Array::from_values([
      Value::from(Object::new()),
      Value::from(Object::new()),
    ]));
    assert!(check_isomorphic(&orig, &split, KeyPolicy::ByReference).is_err());
  }

  proptest! {
    #[test]
    fn numbers_pass_through(x in any::<f64>()) {
      let copy = deep_copy(&Value::from(x)).unwrap();
      prop_assert_eq!(copy.as_number().map(f64::to_bits), Some(x.to_bits()));
    }

    #[test]
    fn strings_pass_through(s in ".*") {
      let copy = deep_copy(&Value::from(s.as_str())).unwrap();
      prop_assert_eq!(copy.as_str(), Some(s.as_str()));
    }

    #[test]
    fn flat_arrays_round_trip(xs in vec(any::<i32>(), 0..64)) {
      let orig = Value::from(Array::from_values(xs.iter().map(|x| Value::from(*x))));
      let copy = deep_copy(&orig).unwrap();
      prop_assert!(!copy.same(&orig));
      let back: Vec<f64> = copy
        .as_array()
        .unwrap()
        .to_vec()
        .iter()
        .filter_map(Value::as_number)
        .collect();
      prop_assert_eq!(back, xs.iter().map(|x| f64::from(*x)).collect::<Vec<_>>());
    }
  }
}
