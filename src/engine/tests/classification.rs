use crate::engine::classification::{ClassifierConfig, IncomeBucket, IncomeClassifier, Level};
use crate::engine::domain::IncomeRecord;

fn classifier() -> IncomeClassifier {
    IncomeClassifier::new(ClassifierConfig::default())
}

#[test]
fn percentages_close_to_one_hundred() {
    let records = [
        IncomeRecord::monthly("salary", 31_000.0, "Factory"),
        IncomeRecord::yearly("crop", 37_000.0, "Wheat"),
        IncomeRecord::monthly("deposit", 333.33, "Bank"),
        IncomeRecord::monthly("lottery", 77.7, "Win"),
    ];

    let analysis = classifier().analyze(&records, 3);
    let sum: f64 = analysis.categories.iter().map(|c| c.percentage).sum();

    assert!((sum - 100.0).abs() < 1e-9, "sum was {sum}");
    assert_eq!(analysis.categories.len(), IncomeBucket::ALL.len());
    let ids: Vec<IncomeBucket> = analysis.categories.iter().map(|c| c.id).collect();
    assert_eq!(ids, IncomeBucket::ALL.to_vec());
}

#[test]
fn zero_income_is_a_valid_low_state() {
    let records = [
        IncomeRecord::monthly("salary", 0.0, "Factory"),
        IncomeRecord::monthly("pension", -12.0, "Fund"),
    ];

    let analysis = classifier().analyze(&records, 0);

    assert_eq!(analysis.total_income, 0.0);
    assert_eq!(analysis.family_size, 1);
    assert_eq!(analysis.per_capita_income, 0.0);
    assert!(analysis
        .categories
        .iter()
        .all(|c| c.amount == 0.0 && c.percentage == 0.0 && c.sources.is_empty()));
    assert_eq!(analysis.stability, Level::Low);
    assert_eq!(analysis.diversification, Level::Low);
    assert_eq!(analysis.primary_source, None);
    assert!(analysis.recommendations[0].starts_with("No income declared"));
}

#[test]
fn ties_resolve_to_first_category_in_taxonomy_order() {
    let records = [
        IncomeRecord::monthly("business", 1_000.0, "Shop"),
        IncomeRecord::monthly("salary", 1_000.0, "Office"),
    ];

    let analysis = classifier().analyze(&records, 2);

    assert_eq!(analysis.primary_source, Some(IncomeBucket::Salary));
    assert_eq!(analysis.stability, Level::Medium);
    assert_eq!(analysis.diversification, Level::Medium);
}

#[test]
fn unmapped_codes_fall_into_other() {
    let classifier = classifier();
    assert_eq!(classifier.bucket_for("lottery"), IncomeBucket::Other);
    assert_eq!(classifier.bucket_for(" Pension "), IncomeBucket::PensionAndBenefits);
    assert_eq!(classifier.bucket_for("property"), IncomeBucket::Rental);

    let records = [IncomeRecord::monthly("lottery", 500.0, "State lottery")];
    let analysis = classifier.analyze(&records, 1);
    let other = analysis.category(IncomeBucket::Other).expect("other bucket");

    assert_eq!(other.amount, 500.0);
    assert_eq!(other.sources, vec!["State lottery".to_string()]);
}

#[test]
fn sources_are_distinct_in_first_seen_order() {
    let records = [
        IncomeRecord::monthly("salary", 1_000.0, "Office"),
        IncomeRecord::monthly("bonus", 200.0, "Office"),
        IncomeRecord::monthly("wages", 300.0, "Night shift"),
        IncomeRecord::monthly("salary", 100.0, ""),
    ];

    let analysis = classifier().analyze(&records, 1);
    let salary = analysis.category(IncomeBucket::Salary).expect("salary bucket");

    assert_eq!(salary.amount, 1_600.0);
    assert_eq!(
        salary.sources,
        vec!["Office".to_string(), "Night shift".to_string(), "salary".to_string()]
    );
}

#[test]
fn recommendations_follow_rule_priority() {
    let records = [IncomeRecord::monthly("salary", 60_000.0, "Factory")];

    let analysis = classifier().analyze(&records, 1);

    assert_eq!(analysis.stability, Level::High);
    assert_eq!(analysis.diversification, Level::Low);
    assert_eq!(analysis.recommendations.len(), 3);
    assert!(analysis.recommendations[0].starts_with("Per-capita income 60000.00"));
    assert!(analysis.recommendations[1].starts_with("100% of income comes from salary and wages"));
    assert!(analysis.recommendations[2].starts_with("Income comes from at most one category"));
}

#[test]
fn large_unclassified_share_is_flagged_on_its_own() {
    let records = [
        IncomeRecord::monthly("salary", 6_000.0, "Office"),
        IncomeRecord::monthly("gift", 4_000.0, "Relatives"),
    ];

    let analysis = classifier().analyze(&records, 10);

    assert_eq!(analysis.per_capita_income, 1_000.0);
    assert_eq!(analysis.stability, Level::Medium);
    assert_eq!(
        analysis.recommendations,
        vec!["40% of income is unclassified; request documents to categorise it".to_string()]
    );
}

#[test]
fn four_categories_rate_as_highly_diversified() {
    let records = [
        IncomeRecord::monthly("salary", 3_500.0, "Office"),
        IncomeRecord::monthly("pension", 3_000.0, "Fund"),
        IncomeRecord::monthly("rent", 2_000.0, "Garage"),
        IncomeRecord::monthly("scholarship", 1_500.0, "University"),
    ];

    let analysis = classifier().analyze(&records, 4);

    assert_eq!(analysis.diversification, Level::High);
    assert_eq!(analysis.stability, Level::Low);
    assert_eq!(analysis.primary_source, Some(IncomeBucket::Salary));
    assert!(analysis.recommendations.is_empty());
}

#[test]
fn analysis_threshold_is_independent_of_eligibility_minimum() {
    let records = [
        IncomeRecord::monthly("salary", 5_000.0, "Office"),
        IncomeRecord::monthly("pension", 5_000.0, "Fund"),
    ];

    let analysis = classifier().analyze(&records, 2);
    assert!(analysis.recommendations[0].contains("guaranteed minimum 4500.00"));

    let relaxed = IncomeClassifier::new(ClassifierConfig {
        analysis_minimum_income: 15_000.0,
        ..ClassifierConfig::default()
    });
    assert!(relaxed.analyze(&records, 2).recommendations.is_empty());
}

#[test]
fn configured_category_codes_match_regardless_of_case() {
    let config: ClassifierConfig =
        serde_json::from_str(r#"{ "category_map": { "Stipend": "education", "Wages ": "salary" } }"#)
            .expect("classifier config parses");
    let classifier = IncomeClassifier::new(config);

    assert_eq!(classifier.bucket_for("stipend"), IncomeBucket::Education);
    assert_eq!(classifier.bucket_for("WAGES"), IncomeBucket::Salary);

    let records = [IncomeRecord::monthly("Stipend", 2_000.0, "University")];
    let analysis = classifier.analyze(&records, 1);
    assert_eq!(analysis.primary_source, Some(IncomeBucket::Education));
}
