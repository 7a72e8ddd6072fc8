use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The eight fixed income categories, declared in taxonomy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeBucket {
    Salary,
    PensionAndBenefits,
    Business,
    Agriculture,
    Education,
    Financial,
    Rental,
    Other,
}

impl IncomeBucket {
    pub const ALL: [IncomeBucket; 8] = [
        IncomeBucket::Salary,
        IncomeBucket::PensionAndBenefits,
        IncomeBucket::Business,
        IncomeBucket::Agriculture,
        IncomeBucket::Education,
        IncomeBucket::Financial,
        IncomeBucket::Rental,
        IncomeBucket::Other,
    ];

    pub const fn display_name(self) -> &'static str {
        match self {
            IncomeBucket::Salary => "Salary and wages",
            IncomeBucket::PensionAndBenefits => "Pensions and social benefits",
            IncomeBucket::Business => "Business and self-employment",
            IncomeBucket::Agriculture => "Agriculture",
            IncomeBucket::Education => "Education-related",
            IncomeBucket::Financial => "Deposits and securities",
            IncomeBucket::Rental => "Rental and property",
            IncomeBucket::Other => "Other income",
        }
    }

    /// Index into [`IncomeBucket::ALL`].
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Income category codes understood out of the box.
pub fn default_category_map() -> BTreeMap<String, IncomeBucket> {
    use IncomeBucket::*;

    let entries: [(&str, IncomeBucket); 30] = [
        ("salary", Salary),
        ("wages", Salary),
        ("bonus", Salary),
        ("employment", Salary),
        ("pension", PensionAndBenefits),
        ("benefit", PensionAndBenefits),
        ("social", PensionAndBenefits),
        ("allowance", PensionAndBenefits),
        ("alimony", PensionAndBenefits),
        ("disability", PensionAndBenefits),
        ("business", Business),
        ("entrepreneur", Business),
        ("self_employment", Business),
        ("patent", Business),
        ("agricultural", Agriculture),
        ("agriculture", Agriculture),
        ("livestock", Agriculture),
        ("crop", Agriculture),
        ("scholarship", Education),
        ("stipend", Education),
        ("education", Education),
        ("deposit", Financial),
        ("interest", Financial),
        ("securities", Financial),
        ("dividends", Financial),
        ("rent", Rental),
        ("rental", Rental),
        ("property", Rental),
        ("lease", Rental),
        ("other", Other),
    ];

    entries
        .into_iter()
        .map(|(code, bucket)| (code.to_string(), bucket))
        .collect()
}
