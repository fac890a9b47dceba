//! Owns the registered templates and the effect index built over them.

use crate::{ActionTpl, ActionTplId, WorldProp};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub(crate) struct ActionTplRegistry {
    tpls: Vec<Box<dyn ActionTpl>>,
    names: Vec<String>,
    by_name: HashMap<String, ActionTplId>,
    /// Templates whose effects set each property, in registration order
    effect_index: [Vec<ActionTplId>; WorldProp::COUNT],
    indexed: usize,
    ever_indexed: bool,
}

impl ActionTplRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, tpl: Box<dyn ActionTpl>) -> ActionTplId {
        let id = ActionTplId(self.tpls.len() as u32);
        self.tpls.push(tpl);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Indexes the templates added since the previous call. Returns how many.
    pub fn end(&mut self) -> usize {
        let start = self.indexed;
        for (offset, tpl) in self.tpls[start..].iter().enumerate() {
            let id = ActionTplId((start + offset) as u32);
            for (prop, _) in tpl.effects().iter() {
                self.effect_index[prop.index()].push(id);
            }
        }

        self.indexed = self.tpls.len();
        self.ever_indexed = true;
        self.indexed - start
    }

    pub fn find(&self, name: &str) -> Option<ActionTplId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: ActionTplId) -> Option<&dyn ActionTpl> {
        self.tpls.get(id.index()).map(|tpl| tpl.as_ref())
    }

    pub fn name(&self, id: ActionTplId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tpls.len()
    }

    pub fn is_indexed(&self) -> bool {
        self.ever_indexed
    }

    pub fn candidates(&self, prop: WorldProp) -> &[ActionTplId] {
        &self.effect_index[prop.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionTplFactory;
    use serde_json::Value as Json;

    fn tpl(kind: &str) -> Box<dyn ActionTpl> {
        ActionTplFactory::with_builtin().create(kind, &Json::Null).unwrap()
    }

    #[test]
    fn test_index_is_incremental() {
        let mut registry = ActionTplRegistry::new();
        assert!(!registry.is_indexed());

        let goto = registry.add("Goto", tpl("Goto"));
        assert!(registry.candidates(WorldProp::AtEntityPos).is_empty());

        assert_eq!(registry.end(), 1);
        assert!(registry.is_indexed());
        assert_eq!(registry.candidates(WorldProp::AtEntityPos), &[goto]);

        let pick = registry.add("PickItem", tpl("PickItem"));
        assert!(registry.candidates(WorldProp::HasItem).is_empty());
        assert_eq!(registry.end(), 1);
        assert_eq!(registry.candidates(WorldProp::HasItem), &[pick]);

        // nothing new, nothing re-indexed
        assert_eq!(registry.end(), 0);
        assert_eq!(registry.candidates(WorldProp::AtEntityPos), &[goto]);
    }

    #[test]
    fn test_lookup() {
        let mut registry = ActionTplRegistry::new();
        let id = registry.add("Equip", tpl("EquipItem"));

        assert_eq!(registry.find("Equip"), Some(id));
        assert_eq!(registry.find("EquipItem"), None);
        assert_eq!(registry.name(id), Some("Equip"));
        assert!(registry.get(id).is_some());
        assert!(registry.get(ActionTplId(9)).is_none());
        assert_eq!(registry.len(), 1);
    }
}
