use fxhash::FxHashMap;

use super::error::VariableError;
use super::outputs::Scalar;
use super::registry::LocationId;

/// What a global variable refers to.
///
/// Channel variables expose the hit count and first value of a Location, and stay bound to
/// the same Location when it is re-mapped to different hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarTarget {
    Scalar(Scalar),
    Channel(LocationId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalVar {
    pub name: String,
    pub description: String,
    pub target: VarTarget,
}

/// The registry through which decoded values are published to the rest of the analysis.
pub trait VariableRegistry {
    /// Define a new variable. Fails if the name is taken.
    fn define(
        &mut self,
        name: &str,
        description: &str,
        target: VarTarget,
    ) -> Result<(), VariableError>;
    /// Remove a variable, returning true if it existed
    fn remove(&mut self, name: &str) -> bool;
    fn find(&self, name: &str) -> Option<&GlobalVar>;

    fn is_defined(&self, name: &str) -> bool {
        self.find(name).is_some()
    }
}

/// Simple in-memory VariableRegistry
#[derive(Debug, Clone, Default)]
pub struct VarList {
    vars: FxHashMap<String, GlobalVar>,
}

impl VarList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// All variable names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.vars.keys().map(|name| name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl VariableRegistry for VarList {
    fn define(
        &mut self,
        name: &str,
        description: &str,
        target: VarTarget,
    ) -> Result<(), VariableError> {
        if self.vars.contains_key(name) {
            return Err(VariableError::AlreadyDefined(name.to_string()));
        }
        self.vars.insert(
            name.to_string(),
            GlobalVar {
                name: name.to_string(),
                description: description.to_string(),
                target,
            },
        );
        Ok(())
    }

    fn remove(&mut self, name: &str) -> bool {
        self.vars.remove(name).is_some()
    }

    fn find(&self, name: &str) -> Option<&GlobalVar> {
        self.vars.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_remove() {
        let mut vars = VarList::new();
        vars.define("D.evtype", "event type", VarTarget::Scalar(Scalar::EvType))
            .unwrap();
        assert!(vars.is_defined("D.evtype"));
        assert!(matches!(
            vars.define("D.evtype", "again", VarTarget::Scalar(Scalar::EvType)),
            Err(VariableError::AlreadyDefined(_))
        ));
        assert_eq!(vars.find("D.evtype").unwrap().description, "event type");
        assert_eq!(vars.names(), vec!["D.evtype"]);
        assert!(vars.remove("D.evtype"));
        assert!(!vars.remove("D.evtype"));
        assert!(vars.is_empty());
    }
}
