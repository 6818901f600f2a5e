//! Binding conditions against a project schema

use mql_ast::ComparisonOp;
use mql_engine::{BindContext, BoundCondition, BoundValue, bind_condition, bind_filter};
use mql_model::{
    Card, InMemoryCards, Project, ProjectVariable, PropertyDefinition, PropertyKind, TeamMember,
    TreeConfiguration,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;

fn project() -> Project {
    Project::new("scrum")
        .with_property(
            PropertyDefinition::new("Status", PropertyKind::Enumerated)
                .with_values(["new", "open", "closed"]),
        )
        .with_property(
            PropertyDefinition::new("Priority", PropertyKind::Enumerated)
                .with_values(["low", "high"])
                .restricted(),
        )
        .with_property(
            PropertyDefinition::new("Estimate", PropertyKind::Numeric)
                .with_values(["1", "2", "4", "8"]),
        )
        .with_property(PropertyDefinition::new("Points", PropertyKind::Numeric))
        .with_property(PropertyDefinition::new("Owner", PropertyKind::User))
        .with_property(PropertyDefinition::new("Due Date", PropertyKind::Date))
        .with_property(PropertyDefinition::new(
            "Release",
            PropertyKind::CardRelationship,
        ))
        .with_member(TeamMember::new("bob", "Bob"))
        .with_variable(
            ProjectVariable::new("Target Estimate", PropertyKind::Numeric, "4")
                .applicable_to(["Estimate"]),
        )
        .with_variable(ProjectVariable::unset("Planned Release", PropertyKind::Text))
        .with_tree(TreeConfiguration::new("Planning").with_member(2, Some(1)))
}

fn cards() -> InMemoryCards {
    InMemoryCards::new()
        .with_card(Card::new(10, "Release One", "Release"))
        .with_card(Card::new(11, "Dup", "Release"))
        .with_card(Card::new(12, "Dup", "Release"))
}

fn bind(text: &str, project: &Project, cards: &InMemoryCards) -> mql_diagnostics::Result<BoundCondition> {
    let query = mql_parser::parse_filter(text)?;
    let ctx = BindContext::new(project, cards);
    let condition = query.condition.expect("filter without a condition");
    bind_condition(&condition, &ctx)
}

fn comparison(property: &str, op: ComparisonOp, value: BoundValue) -> BoundCondition {
    BoundCondition::Comparison {
        property: property.into(),
        kind: PropertyKind::Enumerated,
        op,
        value,
    }
}

#[test]
fn ordering_above_an_element_becomes_equality_on_the_rest() {
    let bound = bind("Status > open", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        comparison("Status", ComparisonOp::Equal, BoundValue::Text("closed".into()))
    );
}

#[test]
fn low_side_ordering_admits_null() {
    let bound = bind("Status <= new", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::In {
            property: "Status".into(),
            kind: PropertyKind::Enumerated,
            values: vec![BoundValue::Null, BoundValue::Text("new".into())],
        }
    );
}

#[test]
fn ordering_past_the_top_degrades_to_constant_false() {
    let bound = bind("Status > closed", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Constant {
            property: "Status".into(),
            value: false,
        }
    );
}

#[test]
fn ordering_below_the_bottom_keeps_only_null() {
    let bound = bind("Status < new", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        comparison("Status", ComparisonOp::Equal, BoundValue::Null)
    );
}

#[test]
fn text_boundary_outside_the_list_fails_closed() {
    let bound = bind("Status > reopened", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Constant {
            property: "Status".into(),
            value: false,
        }
    );
}

#[test]
fn numeric_boundary_between_elements_still_orders() {
    let bound = bind("Estimate > 3", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::In {
            property: "Estimate".into(),
            kind: PropertyKind::Numeric,
            values: vec![
                BoundValue::Number(Decimal::from(4)),
                BoundValue::Number(Decimal::from(8)),
            ],
        }
    );
}

#[test]
fn equality_canonicalizes_to_the_stored_spelling() {
    let bound = bind("status = OPEN", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        comparison("Status", ComparisonOp::Equal, BoundValue::Text("open".into()))
    );
}

#[test]
fn null_equality_survives_on_enumerated_properties() {
    let bound = bind("Status = NULL", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        comparison("Status", ComparisonOp::Equal, BoundValue::Null)
    );
}

#[rstest]
#[case("Frobnitz = 1", 100)]
#[case("Priority = urgent", 102)]
#[case("Priority IN (low, urgent)", 102)]
#[case("Owner = nobody", 104)]
#[case("Release = 'No Such Card'", 105)]
#[case("Release = 'Dup'", 106)]
#[case("Estimate = (No Such Variable)", 107)]
#[case("Status = (Target Estimate)", 107)]
#[case("Due Date = 'not soon'", 109)]
#[case("Points = abc", 110)]
#[case("Estimate >= NULL", 111)]
fn bind_errors_carry_codes(#[case] text: &str, #[case] code: u16) {
    let err = bind(text, &project(), &cards()).unwrap_err();
    assert_eq!(err.code().code(), code, "{text}");
}

#[test]
fn restricted_errors_list_the_allowed_values() {
    let err = bind("Priority = urgent", &project(), &cards()).unwrap_err();
    assert!(err.message().contains("low, high"), "{}", err.message());
}

#[test]
fn variables_bind_their_current_value() {
    let bound = bind("Estimate = (Target Estimate)", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Estimate".into(),
            kind: PropertyKind::Numeric,
            op: ComparisonOp::Equal,
            value: BoundValue::Number(Decimal::from(4)),
        }
    );
}

#[test]
fn unset_variables_bind_as_null() {
    let bound = bind("Name = (Planned Release)", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Name".into(),
            kind: PropertyKind::Text,
            op: ComparisonOp::Equal,
            value: BoundValue::Null,
        }
    );
}

#[test]
fn rebinding_sees_edited_variable_values() {
    let mut project = project();
    let cards = cards();
    project.set_variable_value("Target Estimate", Some("8".into()));
    let bound = bind("Estimate = (Target Estimate)", &project, &cards).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Estimate".into(),
            kind: PropertyKind::Numeric,
            op: ComparisonOp::Equal,
            value: BoundValue::Number(Decimal::from(8)),
        }
    );
}

#[test]
fn today_stays_symbolic_until_apply_time() {
    let bound = bind("Due Date = TODAY", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Due Date".into(),
            kind: PropertyKind::Date,
            op: ComparisonOp::Equal,
            value: BoundValue::Today,
        }
    );
}

#[test]
fn current_user_stays_symbolic_until_apply_time() {
    let bound = bind("Owner = CURRENT USER", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Owner".into(),
            kind: PropertyKind::User,
            op: ComparisonOp::Equal,
            value: BoundValue::CurrentUser,
        }
    );
}

#[test]
fn named_members_bind_by_login() {
    let bound = bind("Owner = bob", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Owner".into(),
            kind: PropertyKind::User,
            op: ComparisonOp::Equal,
            value: BoundValue::User("bob".into()),
        }
    );
}

#[test]
fn card_references_resolve_by_unique_name() {
    let bound = bind("Release = 'Release One'", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Release".into(),
            kind: PropertyKind::CardRelationship,
            op: ComparisonOp::Equal,
            value: BoundValue::Card(10),
        }
    );
}

#[test]
fn card_references_resolve_by_number() {
    let bound = bind("Release = NUMBER 11", &project(), &cards()).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Release".into(),
            kind: PropertyKind::CardRelationship,
            op: ComparisonOp::Equal,
            value: BoundValue::Card(11),
        }
    );
}

#[test]
fn nonexistent_card_numbers_are_rejected() {
    let err = bind("Release = NUMBER 99", &project(), &cards()).unwrap_err();
    assert_eq!(err.code().code(), 105);
}

#[test]
fn this_card_requires_a_context_card() {
    let err = bind("Release = THIS CARD", &project(), &cards()).unwrap_err();
    assert_eq!(err.code().code(), 103);
}

#[test]
fn this_card_binds_the_context_card_number() {
    let project = project();
    let cards = cards();
    let context = Card::new(7, "Story seven", "Story");
    let query = mql_parser::parse_filter("Release = THIS CARD").unwrap();
    let ctx = BindContext::new(&project, &cards).with_this_card(&context);
    let bound = bind_condition(&query.condition.unwrap(), &ctx).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Release".into(),
            kind: PropertyKind::CardRelationship,
            op: ComparisonOp::Equal,
            value: BoundValue::Card(7),
        }
    );
}

#[test]
fn this_card_property_reads_the_context_card() {
    let project = project();
    let cards = cards();
    let context = Card::new(7, "Story seven", "Story").with_property("Estimate", "2");
    let query = mql_parser::parse_filter("Estimate = THIS CARD.Estimate").unwrap();
    let ctx = BindContext::new(&project, &cards).with_this_card(&context);
    let bound = bind_condition(&query.condition.unwrap(), &ctx).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Estimate".into(),
            kind: PropertyKind::Numeric,
            op: ComparisonOp::Equal,
            value: BoundValue::Number(Decimal::from(2)),
        }
    );
}

#[test]
fn unset_context_card_properties_bind_as_null() {
    let project = project();
    let cards = cards();
    let context = Card::new(7, "Story seven", "Story");
    let query = mql_parser::parse_filter("Estimate = THIS CARD.Estimate").unwrap();
    let ctx = BindContext::new(&project, &cards).with_this_card(&context);
    let bound = bind_condition(&query.condition.unwrap(), &ctx).unwrap();
    assert_eq!(
        bound,
        BoundCondition::Comparison {
            property: "Estimate".into(),
            kind: PropertyKind::Numeric,
            op: ComparisonOp::Equal,
            value: BoundValue::Null,
        }
    );
}

#[test]
fn filters_resolve_their_tree_scope() {
    let project = project();
    let cards = cards();
    let query = mql_parser::parse_filter("FROM TREE planning WHERE Status = open").unwrap();
    let ctx = BindContext::new(&project, &cards);
    let filter = bind_filter(&query, &ctx).unwrap();
    assert_eq!(filter.tree.as_deref(), Some("Planning"));
}

#[test]
fn unknown_trees_are_rejected() {
    let project = project();
    let cards = cards();
    let query = mql_parser::parse_filter("FROM TREE Roadmap WHERE Status = open").unwrap();
    let ctx = BindContext::new(&project, &cards);
    let err = bind_filter(&query, &ctx).unwrap_err();
    assert_eq!(err.code().code(), 108);
}

#[test]
fn report_clauses_are_rejected_at_bind_time() {
    let project = project();
    let cards = cards();
    let query = mql_parser::parse_query("SELECT Name WHERE Status = open").unwrap();
    let ctx = BindContext::new(&project, &cards);
    let err = bind_filter(&query, &ctx).unwrap_err();
    assert_eq!(err.code().code(), 101);
    assert!(err.message().contains("SELECT"));
}

#[test]
fn nested_selects_must_name_one_column() {
    let project = project();
    let cards = cards();
    let query =
        mql_parser::parse_filter("Release IN (SELECT Number, Name WHERE Status = open)").unwrap();
    let ctx = BindContext::new(&project, &cards);
    let err = bind_condition(&query.condition.unwrap(), &ctx).unwrap_err();
    assert_eq!(err.code().code(), 101);
}
