//! Whole-pipeline tests over the facade crate

use chrono::NaiveDate;
use mql::model::{
    Card, InMemoryCards, Project, ProjectVariable, PropertyDefinition, PropertyKind,
    TreeConfiguration,
};
use mql::{
    AggregateScope, AggregateSpec, ApplyContext, BindContext, CardRepository, bind_filter,
    compile_filter, evaluate_aggregate, filter_cards, format_filter, format_query, parse_filter,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn project() -> Project {
    Project::new("scrum")
        .with_property(
            PropertyDefinition::new("Status", PropertyKind::Enumerated)
                .with_values(["new", "open", "closed"]),
        )
        .with_property(PropertyDefinition::new("Estimate", PropertyKind::Numeric))
        .with_variable(ProjectVariable::new(
            "Current Sprint",
            PropertyKind::Text,
            "sprint one",
        ))
        .with_property(PropertyDefinition::new("Sprint", PropertyKind::Text))
        .with_tree(
            TreeConfiguration::new("Planning")
                .with_member(2, Some(1))
                .with_member(3, Some(1)),
        )
}

fn cards() -> InMemoryCards {
    InMemoryCards::new()
        .with_card(Card::new(1, "Epic", "Epic"))
        .with_card(
            Card::new(2, "Login page", "Story")
                .with_property("Status", "open")
                .with_property("Estimate", "2")
                .with_property("Sprint", "sprint one"),
        )
        .with_card(
            Card::new(3, "Logout page", "Story")
                .with_property("Status", "closed")
                .with_property("Estimate", "4"),
        )
}

fn apply() -> ApplyContext<'static> {
    ApplyContext::new(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap())
}

#[rstest]
#[case("status = open")]
#[case("select name, number where type = Story order by number desc")]
#[case("Status IN (new, open) AND NOT (Estimate > 3)")]
#[case("from tree planning where tagged with urgent")]
fn formatting_round_trips_and_is_idempotent(#[case] text: &str) {
    let once = format_query(text).unwrap();
    let twice = format_query(&once).unwrap();
    assert_eq!(once, twice, "{text}");
}

#[test]
fn canonical_form_normalizes_keywords_and_spacing() {
    assert_eq!(
        format_query("select name where status=open").unwrap(),
        "SELECT name WHERE status = open"
    );
    assert_eq!(
        format_filter("estimate>2 and status!=closed").unwrap(),
        "estimate > 2 AND status != closed"
    );
}

#[test]
fn multi_word_values_quote_on_demand() {
    assert_eq!(
        format_filter("Sprint = 'sprint one'").unwrap(),
        "Sprint = 'sprint one'"
    );
}

fn run(text: &str, project: &Project, cards: &InMemoryCards) -> Vec<u64> {
    let query = parse_filter(text).unwrap();
    let ctx = BindContext::new(project, cards);
    let bound = bind_filter(&query, &ctx).unwrap();
    let compiled = compile_filter(&bound, &apply()).unwrap();
    filter_cards(cards.scan().unwrap(), &compiled, project, cards)
        .unwrap()
        .into_iter()
        .map(|card| card.number)
        .collect()
}

#[test]
fn enumerated_orderings_filter_by_list_rank() {
    let project = project();
    let cards = cards();
    assert_eq!(run("Status > open", &project, &cards), vec![3]);
    assert_eq!(run("Status <= new", &project, &cards), vec![1]);
}

#[test]
fn variables_re_resolve_on_every_bind() {
    let mut project = project();
    let cards = cards();
    assert_eq!(run("Sprint = (Current Sprint)", &project, &cards), vec![2]);

    project.set_variable_value("Current Sprint", Some("sprint two".into()));
    assert_eq!(run("Sprint = (Current Sprint)", &project, &cards), Vec::<u64>::new());
}

#[test]
fn this_card_property_binds_the_context_value() {
    let project = project();
    let cards = cards();
    let context = cards.find_by_number(2).unwrap().unwrap().clone();
    let query = parse_filter("Estimate = THIS CARD.Estimate").unwrap();
    let ctx = BindContext::new(&project, &cards).with_this_card(&context);
    let bound = bind_filter(&query, &ctx).unwrap();
    let compiled = compile_filter(&bound, &apply()).unwrap();
    let matched = filter_cards(cards.scan().unwrap(), &compiled, &project, &cards).unwrap();
    assert_eq!(matched.into_iter().map(|c| c.number).collect::<Vec<_>>(), vec![2]);
}

fn aggregate(
    kind: &str,
    property: Option<&str>,
    scope: AggregateScope,
    project: &Project,
    cards: &InMemoryCards,
) -> Option<String> {
    let context = cards.find_by_number(1).unwrap().unwrap().clone();
    let spec = AggregateSpec::from_params(kind, property, project);
    let ctx = BindContext::new(project, cards);
    evaluate_aggregate(&spec, &scope, "Planning", &context, &ctx, &apply()).unwrap()
}

#[test]
fn aggregate_null_rules_hold() {
    let project = project();
    let populated = cards();
    // A tree whose context card has no descendants at all
    let empty = InMemoryCards::new().with_card(Card::new(1, "Epic", "Epic"));

    assert_eq!(
        aggregate("sum", Some("Estimate"), AggregateScope::AllDescendants, &project, &populated),
        Some("6".into())
    );
    assert_eq!(
        aggregate("sum", Some("Estimate"), AggregateScope::AllDescendants, &project, &empty),
        None
    );
    assert_eq!(
        aggregate("avg", Some("Estimate"), AggregateScope::AllDescendants, &project, &empty),
        Some("0".into())
    );
    assert_eq!(
        aggregate("min", Some("Estimate"), AggregateScope::AllDescendants, &project, &empty),
        None
    );
    assert_eq!(
        aggregate("count", None, AggregateScope::AllDescendants, &project, &empty),
        Some("0".into())
    );
}

#[test]
fn sum_of_a_nonexistent_property_degrades_to_count() {
    let project = project();
    let cards = cards();
    assert_eq!(
        aggregate("sum", Some("Frobnitz"), AggregateScope::AllDescendants, &project, &cards),
        Some("2".into())
    );
}

#[test]
fn contradictory_conditions_reduce_over_no_cards_without_error() {
    let project = project();
    let cards = cards();
    // No Status value is above the top of the list
    let condition = parse_filter("Status > closed").unwrap().condition.unwrap();
    assert_eq!(
        aggregate(
            "sum",
            Some("Estimate"),
            AggregateScope::Condition(condition.clone()),
            &project,
            &cards
        ),
        None
    );
    assert_eq!(
        aggregate(
            "avg",
            Some("Estimate"),
            AggregateScope::Condition(condition),
            &project,
            &cards
        ),
        Some("0".into())
    );
}
