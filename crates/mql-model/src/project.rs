//! The project schema snapshot

use crate::{ProjectVariable, PropertyDefinition, PropertyKind, TeamMember, TreeConfiguration};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A read-only snapshot of everything the engine knows about a project.
///
/// Properties keep their definition order. The `Number`, `Name` and `Type`
/// built-ins are always present. The snapshot is not versioned inside the
/// engine; callers re-bind queries after editing the schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project name
    pub name: String,
    /// Property definitions, keyed by lower-cased name, in definition order
    properties: IndexMap<String, PropertyDefinition>,
    /// Card type names
    pub card_types: Vec<String>,
    /// Project variables
    variables: Vec<ProjectVariable>,
    /// Tree configurations
    trees: Vec<TreeConfiguration>,
    /// Team members
    members: Vec<TeamMember>,
    /// Display precision for numeric results
    pub precision: u32,
    /// Equality tolerance when matching numeric literals against managed
    /// value lists (so `1.00` matches a stored `1`)
    pub numeric_epsilon: Decimal,
}

impl Project {
    /// Create a project with the built-in properties only
    pub fn new(name: impl Into<String>) -> Self {
        let mut project = Self {
            name: name.into(),
            properties: IndexMap::new(),
            card_types: Vec::new(),
            variables: Vec::new(),
            trees: Vec::new(),
            members: Vec::new(),
            precision: 2,
            numeric_epsilon: Decimal::new(1, 3),
        };
        for built_in in [
            PropertyDefinition::new("Number", PropertyKind::Numeric),
            PropertyDefinition::new("Name", PropertyKind::Text),
            PropertyDefinition::new("Type", PropertyKind::Text),
        ] {
            project.add_property(built_in);
        }
        project
    }

    /// Add a property definition
    pub fn add_property(&mut self, property: PropertyDefinition) {
        self.properties
            .insert(property.name.to_lowercase(), property);
    }

    /// Builder form of [`add_property`](Self::add_property)
    pub fn with_property(mut self, property: PropertyDefinition) -> Self {
        self.add_property(property);
        self
    }

    /// Add a card type name
    pub fn with_card_type(mut self, name: impl Into<String>) -> Self {
        self.card_types.push(name.into());
        self
    }

    /// Add a project variable
    pub fn with_variable(mut self, variable: ProjectVariable) -> Self {
        self.variables.push(variable);
        self
    }

    /// Add a tree configuration
    pub fn with_tree(mut self, tree: TreeConfiguration) -> Self {
        self.trees.push(tree);
        self
    }

    /// Add a team member
    pub fn with_member(mut self, member: TeamMember) -> Self {
        self.members.push(member);
        self
    }

    /// Set the numeric display precision and a matching epsilon
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self.numeric_epsilon = Decimal::new(1, precision + 1);
        self
    }

    /// Look up a property by name (case-insensitive)
    pub fn find_property(&self, name: &str) -> Option<&PropertyDefinition> {
        self.properties.get(&name.to_lowercase())
    }

    /// Property definitions in definition order
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.properties.values()
    }

    /// Look up a project variable by name (case-insensitive)
    pub fn find_variable(&self, name: &str) -> Option<&ProjectVariable> {
        self.variables
            .iter()
            .find(|variable| variable.name.eq_ignore_ascii_case(name))
    }

    /// Replace a variable's value; used when variables are edited between
    /// binds
    pub fn set_variable_value(&mut self, name: &str, value: Option<String>) {
        if let Some(variable) = self
            .variables
            .iter_mut()
            .find(|variable| variable.name.eq_ignore_ascii_case(name))
        {
            variable.value = value;
        }
    }

    /// Look up a tree by name (case-insensitive)
    pub fn find_tree(&self, name: &str) -> Option<&TreeConfiguration> {
        self.trees
            .iter()
            .find(|tree| tree.name.eq_ignore_ascii_case(name))
    }

    /// Look up a team member by login (case-insensitive)
    pub fn find_member(&self, login: &str) -> Option<&TeamMember> {
        self.members
            .iter()
            .find(|member| member.login.eq_ignore_ascii_case(login))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_ins_are_always_present() {
        let project = Project::new("demo");
        assert!(project.find_property("number").is_some());
        assert!(project.find_property("NAME").is_some());
        assert!(project.find_property("Type").is_some());
    }

    #[test]
    fn property_lookup_is_case_insensitive() {
        let project = Project::new("demo").with_property(PropertyDefinition::new(
            "Planned For",
            PropertyKind::Text,
        ));
        assert!(project.find_property("planned for").is_some());
    }

    #[test]
    fn precision_derives_epsilon() {
        let project = Project::new("demo").with_precision(2);
        assert_eq!(project.numeric_epsilon, Decimal::new(1, 3));
    }
}
