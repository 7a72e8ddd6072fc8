use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Household, IncomeRecord};

/// Monthly-normalized income, in aggregate and per source label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IncomeAggregate {
    pub total_monthly: f64,
    pub per_source_monthly: BTreeMap<String, f64>,
}

/// Sum the monthly-normalized amounts; records that normalize to 0 are skipped.
pub fn aggregate<'a, I>(records: I) -> IncomeAggregate
where
    I: IntoIterator<Item = &'a IncomeRecord>,
{
    let mut aggregate = IncomeAggregate::default();
    for record in records {
        let monthly = record.normalized_monthly();
        if monthly <= 0.0 {
            continue;
        }
        aggregate.total_monthly += monthly;
        *aggregate
            .per_source_monthly
            .entry(record.source_label().to_string())
            .or_insert(0.0) += monthly;
    }
    aggregate
}

/// Every income record the pipeline consumes for a household.
///
/// Explicit records come first, then each person's fixed income sub-fields, then the monthly
/// yield of financial assets.
pub fn household_income_records(household: &Household) -> Vec<IncomeRecord> {
    let mut records: Vec<IncomeRecord> = household.income_records.values().cloned().collect();

    for person in household.people() {
        for (category, amount) in person.income.entries() {
            if amount > 0.0 && amount.is_finite() {
                records.push(IncomeRecord::monthly(category, amount, person.full_name.clone()));
            }
        }
    }

    for asset in household.financial_assets.values() {
        let monthly = asset.monthly_income();
        if monthly > 0.0 {
            records.push(IncomeRecord::monthly(
                asset.kind.clone(),
                monthly,
                format!("{} yield", asset.kind),
            ));
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::domain::{FamilyMember, FinancialAsset, MemberIncome, Relation};

    #[test]
    fn mixed_periodicity_sums_to_monthly_total() {
        let records = [
            IncomeRecord::monthly("salary", 30_000.0, "Factory"),
            IncomeRecord::yearly("agricultural", 120_000.0, "Harvest"),
            IncomeRecord::monthly("pension", 5_000.0, "Factory"),
        ];

        let result = aggregate(&records);

        assert!((result.total_monthly - 45_000.0).abs() < 1e-9);
        assert_eq!(result.per_source_monthly.get("Factory"), Some(&35_000.0));
        assert_eq!(result.per_source_monthly.get("Harvest"), Some(&10_000.0));
    }

    #[test]
    fn invalid_amounts_never_reach_totals() {
        let records = [
            IncomeRecord::monthly("salary", -100.0, "Refund"),
            IncomeRecord::monthly("salary", f64::INFINITY, "Overflow"),
            IncomeRecord::monthly("salary", 0.0, "Nothing"),
            IncomeRecord::monthly("other", 250.0, ""),
        ];

        let result = aggregate(&records);

        assert_eq!(result.total_monthly, 250.0);
        assert_eq!(result.per_source_monthly.len(), 1);
        assert_eq!(result.per_source_monthly.get("other"), Some(&250.0));
    }

    #[test]
    fn household_records_include_member_fields_and_asset_yield() {
        let applicant = FamilyMember::new("Dana", Relation::Applicant).with_income(MemberIncome {
            salary: 20_000.0,
            ..MemberIncome::default()
        });
        let mut household = Household::new(applicant);
        household.add_member(FamilyMember::new("Serik", Relation::Spouse).with_income(
            MemberIncome {
                pension: 8_000.0,
                other: -1.0,
                ..MemberIncome::default()
            },
        ));
        household.add_financial_asset(FinancialAsset {
            kind: "deposit".to_string(),
            principal: 120_000.0,
            annual_rate_pct: 10.0,
        });
        household.add_income_record(IncomeRecord::yearly("rent", 24_000.0, "Garage"));

        let records = household_income_records(&household);
        let categories: Vec<&str> = records.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["rent", "salary", "pension", "deposit"]);

        let total = aggregate(&records).total_monthly;
        assert!((total - (2_000.0 + 20_000.0 + 8_000.0 + 1_000.0)).abs() < 1e-9);
    }
}
