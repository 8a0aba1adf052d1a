// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tree transfer between processes as positional deltas.
//!
//! A [`TreeSender`] remembers the last version of every compilation unit it
//! sent. Sending a unit again produces only the differences against that
//! baseline, as a flat, depth-first sequence of [`RpcEvent`]s:
//!
//! - `NoChange`: the value equals the baseline value
//! - `Add` / `Change`: a new value in full (no baseline, or a different shape)
//! - `Delete`: the value became `null`
//! - `EnterObject`: the object has the baseline's fields; one event per field
//!   follows, in field order
//! - `ListHeader`: a list follows, one event per element; `positions` gives
//!   each element's index in the baseline list, or `-1` for an added element
//!
//! A [`TreeReceiver`] keeps the same baselines and applies the events to
//! rebuild the unit. The type table is transmitted with the first unit and
//! whenever the sender's table changes; every received unit shares the
//! receiver's copy.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use treewright_core::NodeId;

use crate::error::RpcError;
use crate::tree::CompilationUnit;
use crate::types::TypeTable;

/// One positional difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RpcEvent {
    NoChange,
    Add { value: Value },
    Change { value: Value },
    Delete,
    EnterObject,
    ListHeader { positions: Vec<i64> },
}

/// Everything needed to transmit one compilation unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcBatch {
    /// The id of the transmitted unit, which keys the baseline.
    pub root: NodeId,
    /// The type table, when it has not been sent before.
    pub types: Option<TypeTable>,
    pub events: Vec<RpcEvent>,
}

/// The sending side of the protocol.
#[derive(Debug, Default)]
pub struct TreeSender {
    baselines: HashMap<NodeId, Value>,
    sent_types: Option<Arc<TypeTable>>,
}

impl TreeSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `unit` against the last version sent under the same id.
    pub fn send(&mut self, unit: &Arc<CompilationUnit>) -> Result<RpcBatch, RpcError> {
        let value = serde_json::to_value(unit.as_ref())?;
        let mut events = Vec::new();
        diff(self.baselines.get(&unit.id), &value, &mut events);

        let types_sent = self
            .sent_types
            .as_ref()
            .is_some_and(|t| Arc::ptr_eq(t, &unit.types));
        let types = if types_sent {
            None
        } else {
            self.sent_types = Some(Arc::clone(&unit.types));
            Some(unit.types.as_ref().clone())
        };

        debug!(root = %unit.id, events = events.len(), with_types = types.is_some(), "sending tree");
        self.baselines.insert(unit.id, value);
        Ok(RpcBatch {
            root: unit.id,
            types,
            events,
        })
    }

    /// Forget the baseline for `root`; the next send transmits it in full.
    pub fn reset(&mut self, root: NodeId) {
        self.baselines.remove(&root);
    }
}

/// The receiving side of the protocol.
#[derive(Debug, Default)]
pub struct TreeReceiver {
    baselines: HashMap<NodeId, Value>,
    types: Option<Arc<TypeTable>>,
}

impl TreeReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `batch` to the stored baseline and rebuild the unit.
    pub fn receive(&mut self, batch: RpcBatch) -> Result<Arc<CompilationUnit>, RpcError> {
        if let Some(types) = batch.types {
            self.types = Some(Arc::new(types));
        }

        let mut events = batch.events.into_iter();
        let baseline = self.baselines.get(&batch.root);
        let value = match apply(baseline, &mut events, "$") {
            Ok(value) => value,
            Err(RpcError::UnexpectedEvent { event, path }) if baseline.is_none() && path == "$" => {
                return Err(RpcError::MissingBaseline(format!("{} ({})", batch.root, event)));
            }
            Err(e) => {
                warn!(root = %batch.root, error = %e, "cannot apply tree delta");
                return Err(e);
            }
        };
        let trailing = events.count();
        if trailing > 0 {
            return Err(RpcError::TrailingEvents(trailing));
        }

        let unit: CompilationUnit = serde_json::from_value(value.clone())?;
        self.baselines.insert(batch.root, value);
        let types = self.types.clone().unwrap_or_default();
        Ok(Arc::new(unit).with_types(types))
    }
}

/// The id of a list element, if it is a node or a padded node.
fn element_id(value: &Value) -> Option<&Value> {
    let object = value.as_object()?;
    if let Some(element) = object.get("element") {
        return element_id(element);
    }
    if let Some(id) = object.get("id") {
        return Some(id);
    }
    // An externally tagged `Tree` variant: `{"Identifier": {...}}`.
    match object.len() {
        1 => object.values().next()?.as_object()?.get("id"),
        _ => None,
    }
}

fn same_shape(before: &Map<String, Value>, after: &Map<String, Value>) -> bool {
    before.len() == after.len() && before.keys().all(|k| after.contains_key(k))
}

fn diff(before: Option<&Value>, after: &Value, events: &mut Vec<RpcEvent>) {
    let Some(before) = before else {
        events.push(RpcEvent::Add {
            value: after.clone(),
        });
        return;
    };
    if before == after {
        events.push(RpcEvent::NoChange);
        return;
    }
    match (before, after) {
        (_, Value::Null) => events.push(RpcEvent::Delete),
        (Value::Object(b), Value::Object(a)) if same_shape(b, a) => {
            events.push(RpcEvent::EnterObject);
            for (key, old) in b {
                if let Some(new) = a.get(key) {
                    diff(Some(old), new, events);
                }
            }
        }
        (Value::Array(b), Value::Array(a)) => {
            let positions: Vec<i64> = a
                .iter()
                .enumerate()
                .map(|(i, item)| baseline_position(b, i, item))
                .collect();
            events.push(RpcEvent::ListHeader {
                positions: positions.clone(),
            });
            for (item, position) in a.iter().zip(positions) {
                let old = usize::try_from(position).ok().and_then(|p| b.get(p));
                diff(old, item, events);
            }
        }
        _ => events.push(RpcEvent::Change {
            value: after.clone(),
        }),
    }
}

/// The baseline index of `item` (at `index` in the new list): matched by
/// node id when it has one, otherwise by position.
fn baseline_position(baseline: &[Value], index: usize, item: &Value) -> i64 {
    match element_id(item) {
        Some(id) => baseline
            .iter()
            .position(|old| element_id(old) == Some(id))
            .map_or(-1, |p| p as i64),
        None if index < baseline.len() => index as i64,
        None => -1,
    }
}

fn apply(
    before: Option<&Value>,
    events: &mut impl Iterator<Item = RpcEvent>,
    path: &str,
) -> Result<Value, RpcError> {
    let event = events.next().ok_or(RpcError::UnexpectedEnd)?;
    let unexpected = |event: &RpcEvent| RpcError::UnexpectedEvent {
        event: format!("{:?}", event),
        path: path.to_string(),
    };
    match event {
        RpcEvent::NoChange => before.cloned().ok_or_else(|| unexpected(&RpcEvent::NoChange)),
        RpcEvent::Add { value } | RpcEvent::Change { value } => Ok(value),
        RpcEvent::Delete => Ok(Value::Null),
        RpcEvent::EnterObject => {
            let Some(Value::Object(fields)) = before else {
                return Err(unexpected(&RpcEvent::EnterObject));
            };
            let mut rebuilt = Map::new();
            for (key, old) in fields {
                let value = apply(Some(old), events, &format!("{}.{}", path, key))?;
                rebuilt.insert(key.clone(), value);
            }
            Ok(Value::Object(rebuilt))
        }
        RpcEvent::ListHeader { positions } => {
            let Some(Value::Array(items)) = before else {
                return Err(unexpected(&RpcEvent::ListHeader { positions }));
            };
            let mut rebuilt = Vec::with_capacity(positions.len());
            for (i, position) in positions.iter().enumerate() {
                let old = match usize::try_from(*position) {
                    Ok(p) => Some(items.get(p).ok_or(RpcError::InvalidPosition {
                        position: *position,
                        len: items.len(),
                    })?),
                    Err(_) => None,
                };
                rebuilt.push(apply(old, events, &format!("{}[{}]", path, i))?);
            }
            Ok(Value::Array(rebuilt))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unchanged_value_is_one_event() {
        let v = json!({"a": 1, "b": [1, 2]});
        let mut events = Vec::new();
        diff(Some(&v), &v, &mut events);
        assert_eq!(events, vec![RpcEvent::NoChange]);
    }

    #[test]
    fn test_list_positions() {
        let before = json!([{"id": 1}, {"id": 2}]);
        let after = json!([{"id": 2}, {"id": 3}]);
        let mut events = Vec::new();
        diff(Some(&before), &after, &mut events);
        assert_eq!(
            events[0],
            RpcEvent::ListHeader {
                positions: vec![1, -1]
            }
        );
        let rebuilt = apply(Some(&before), &mut events.into_iter(), "$").unwrap();
        assert_eq!(rebuilt, after);
    }

    #[test]
    fn test_apply_reports_short_stream() {
        let before = json!({"a": 1, "b": 2});
        let events = vec![RpcEvent::EnterObject, RpcEvent::NoChange];
        let err = apply(Some(&before), &mut events.into_iter(), "$").unwrap_err();
        assert!(matches!(err, RpcError::UnexpectedEnd));
    }
}
