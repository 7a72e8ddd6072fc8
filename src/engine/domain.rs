use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::arena::{EntryArena, EntryId};

/// Age at which a member stops counting as a child.
pub const ADULT_AGE: u32 = 18;

/// Clamp a declared quantity to a usable non-negative finite value.
pub(crate) fn sanitize_amount(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Divisor for per-capita figures; a family size of 0 counts as 1.
pub(crate) fn effective_family_size(family_size: usize) -> usize {
    family_size.max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    #[serde(other)]
    Unspecified,
}

/// Relation of a household member to the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Applicant,
    Spouse,
    Son,
    Daughter,
    Child,
    Stepchild,
    Grandchild,
    Father,
    Mother,
    Sibling,
    #[default]
    #[serde(other)]
    Other,
}

impl Relation {
    pub const fn is_child_category(self) -> bool {
        matches!(
            self,
            Relation::Son
                | Relation::Daughter
                | Relation::Child
                | Relation::Stepchild
                | Relation::Grandchild
        )
    }
}

/// Fixed monthly income breakdown declared per person.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemberIncome {
    pub salary: f64,
    pub pension: f64,
    pub benefit: f64,
    pub business: f64,
    pub property: f64,
    pub agricultural: f64,
    pub other: f64,
}

impl MemberIncome {
    /// Category codes paired with the declared monthly amount for each sub-field.
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("salary", self.salary),
            ("pension", self.pension),
            ("benefit", self.benefit),
            ("business", self.business),
            ("property", self.property),
            ("agricultural", self.agricultural),
            ("other", self.other),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
    pub gender: Gender,
    pub citizenship: Option<String>,
    pub document_reference: Option<String>,
    pub relation: Relation,
    pub income: MemberIncome,
}

impl FamilyMember {
    pub fn new(full_name: impl Into<String>, relation: Relation) -> Self {
        Self {
            full_name: full_name.into(),
            birth_date: None,
            gender: Gender::Unspecified,
            citizenship: None,
            document_reference: None,
            relation,
            income: MemberIncome::default(),
        }
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    pub fn with_income(mut self, income: MemberIncome) -> Self {
        self.income = income;
        self
    }

    /// Whole years at `as_of`. Missing or future birth dates yield 0.
    pub fn age(&self, as_of: NaiveDate) -> u32 {
        self.birth_date
            .and_then(|birth| as_of.years_since(birth))
            .unwrap_or(0)
    }

    pub fn is_child(&self, as_of: NaiveDate) -> bool {
        self.age(as_of) < ADULT_AGE || self.relation.is_child_category()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandUnit {
    #[default]
    Sotok,
    #[serde(alias = "ha")]
    Hectare,
    #[serde(alias = "m2")]
    Sqm,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandPlot {
    pub kind: String,
    pub area: f64,
    pub unit: LandUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestockEntry {
    pub kind: String,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    #[serde(alias = "car", alias = "passenger")]
    PassengerCar,
    Truck,
    Bus,
    Motorcycle,
    Tractor,
    Trailer,
    #[default]
    #[serde(other)]
    Other,
}

impl VehicleKind {
    pub const fn is_passenger_car(self) -> bool {
        matches!(self, VehicleKind::PassengerCar)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub kind: VehicleKind,
    pub model_year: Option<i32>,
    pub model: String,
}

/// Deposit, securities, or similar holding that yields recurring income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAsset {
    pub kind: String,
    pub principal: f64,
    pub annual_rate_pct: f64,
}

impl FinancialAsset {
    pub fn monthly_income(&self) -> f64 {
        let yearly = sanitize_amount(self.principal) * sanitize_amount(self.annual_rate_pct) / 100.0;
        sanitize_amount(yearly / 12.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Periodicity {
    #[default]
    Monthly,
    #[serde(alias = "annual")]
    Yearly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub category: String,
    pub amount: f64,
    pub periodicity: Periodicity,
    pub source: String,
    pub period: Option<String>,
}

impl IncomeRecord {
    pub fn monthly(category: impl Into<String>, amount: f64, source: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            amount,
            periodicity: Periodicity::Monthly,
            source: source.into(),
            period: None,
        }
    }

    pub fn yearly(category: impl Into<String>, amount: f64, source: impl Into<String>) -> Self {
        Self {
            periodicity: Periodicity::Yearly,
            ..Self::monthly(category, amount, source)
        }
    }

    /// Monthly-equivalent amount; negative and non-finite amounts count as 0.
    pub fn normalized_monthly(&self) -> f64 {
        let amount = sanitize_amount(self.amount);
        match self.periodicity {
            Periodicity::Monthly => amount,
            Periodicity::Yearly => amount / 12.0,
        }
    }

    /// Label used for per-source aggregation, falling back to the category code.
    pub fn source_label(&self) -> &str {
        let trimmed = self.source.trim();
        if trimmed.is_empty() {
            self.category.trim()
        } else {
            trimmed
        }
    }
}

/// Child entry consumed by the benefit calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildEntry {
    pub name: String,
    pub age: u32,
}

/// Raised when an edit addresses an entry the household does not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HouseholdError {
    #[error("household member {0} not found")]
    MemberNotFound(EntryId),
    #[error("{collection} entry {id} not found")]
    EntryNotFound {
        collection: &'static str,
        id: EntryId,
    },
}

/// Applicant plus every collection the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub applicant: FamilyMember,
    pub members: EntryArena<FamilyMember>,
    pub land_plots: EntryArena<LandPlot>,
    pub livestock: EntryArena<LivestockEntry>,
    pub vehicles: EntryArena<Vehicle>,
    pub financial_assets: EntryArena<FinancialAsset>,
    pub income_records: EntryArena<IncomeRecord>,
}

fn missing(collection: &'static str, id: EntryId) -> HouseholdError {
    HouseholdError::EntryNotFound { collection, id }
}

impl Household {
    pub fn new(mut applicant: FamilyMember) -> Self {
        applicant.relation = Relation::Applicant;
        Self {
            applicant,
            members: EntryArena::new(),
            land_plots: EntryArena::new(),
            livestock: EntryArena::new(),
            vehicles: EntryArena::new(),
            financial_assets: EntryArena::new(),
            income_records: EntryArena::new(),
        }
    }

    /// Members plus the applicant; always at least 1.
    pub fn family_size(&self) -> usize {
        self.members.len() + 1
    }

    pub fn add_member(&mut self, member: FamilyMember) -> EntryId {
        self.members.insert(member)
    }

    pub fn update_member(
        &mut self,
        id: EntryId,
        member: FamilyMember,
    ) -> Result<(), HouseholdError> {
        let slot = self
            .members
            .get_mut(id)
            .ok_or(HouseholdError::MemberNotFound(id))?;
        *slot = member;
        Ok(())
    }

    pub fn remove_member(&mut self, id: EntryId) -> Result<FamilyMember, HouseholdError> {
        self.members
            .remove(id)
            .ok_or(HouseholdError::MemberNotFound(id))
    }

    pub fn add_land_plot(&mut self, plot: LandPlot) -> EntryId {
        self.land_plots.insert(plot)
    }

    pub fn remove_land_plot(&mut self, id: EntryId) -> Result<LandPlot, HouseholdError> {
        self.land_plots
            .remove(id)
            .ok_or_else(|| missing("land plot", id))
    }

    pub fn add_livestock(&mut self, entry: LivestockEntry) -> EntryId {
        self.livestock.insert(entry)
    }

    pub fn remove_livestock(&mut self, id: EntryId) -> Result<LivestockEntry, HouseholdError> {
        self.livestock
            .remove(id)
            .ok_or_else(|| missing("livestock", id))
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> EntryId {
        self.vehicles.insert(vehicle)
    }

    pub fn remove_vehicle(&mut self, id: EntryId) -> Result<Vehicle, HouseholdError> {
        self.vehicles.remove(id).ok_or_else(|| missing("vehicle", id))
    }

    pub fn add_financial_asset(&mut self, asset: FinancialAsset) -> EntryId {
        self.financial_assets.insert(asset)
    }

    pub fn remove_financial_asset(
        &mut self,
        id: EntryId,
    ) -> Result<FinancialAsset, HouseholdError> {
        self.financial_assets
            .remove(id)
            .ok_or_else(|| missing("financial asset", id))
    }

    pub fn add_income_record(&mut self, record: IncomeRecord) -> EntryId {
        self.income_records.insert(record)
    }

    pub fn remove_income_record(&mut self, id: EntryId) -> Result<IncomeRecord, HouseholdError> {
        self.income_records
            .remove(id)
            .ok_or_else(|| missing("income record", id))
    }

    /// Children among the members (the applicant is never counted).
    pub fn children(&self, as_of: NaiveDate) -> Vec<ChildEntry> {
        self.members
            .values()
            .filter(|member| member.is_child(as_of))
            .map(|member| ChildEntry {
                name: member.full_name.clone(),
                age: member.age(as_of),
            })
            .collect()
    }

    pub fn people(&self) -> impl Iterator<Item = &FamilyMember> {
        std::iter::once(&self.applicant).chain(self.members.values())
    }
}

// ---------------------------------------------------------------------------
// Submission boundary: lenient payloads with defaults applied on conversion.
// ---------------------------------------------------------------------------

/// Accepts numbers or numeric strings; anything else becomes 0.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let parsed = match value {
        Some(serde_json::Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(raw)) => {
            raw.trim().replace(',', ".").parse::<f64>().unwrap_or(0.0)
        }
        _ => 0.0,
    };
    Ok(sanitize_amount(parsed))
}

/// Map keyed by code, with keys trimmed and lowercased so lookups match however they were written.
pub(crate) fn lowercase_keys<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    let raw = BTreeMap::<String, V>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(key, value)| (key.trim().to_lowercase(), value))
        .collect())
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(number)) => {
            number.as_i64().and_then(|year| i32::try_from(year).ok())
        }
        Some(serde_json::Value::String(raw)) => raw.trim().parse::<i32>().ok(),
        _ => None,
    }
    .filter(|year| *year > 0))
}

/// Parses `YYYY-MM-DD` or `DD.MM.YYYY`.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d.%m.%Y"))
        .ok()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberIncomeSubmission {
    #[serde(deserialize_with = "lenient_number")]
    pub salary: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub pension: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub benefit: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub business: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub property: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub agricultural: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub other: f64,
}

impl From<MemberIncomeSubmission> for MemberIncome {
    fn from(value: MemberIncomeSubmission) -> Self {
        Self {
            salary: value.salary,
            pension: value.pension,
            benefit: value.benefit,
            business: value.business,
            property: value.property,
            agricultural: value.agricultural,
            other: value.other,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberSubmission {
    pub full_name: String,
    pub birth_date: Option<String>,
    pub gender: Gender,
    pub citizenship: Option<String>,
    pub document_reference: Option<String>,
    pub relation: Relation,
    pub income: MemberIncomeSubmission,
}

impl From<MemberSubmission> for FamilyMember {
    fn from(value: MemberSubmission) -> Self {
        Self {
            full_name: value.full_name.trim().to_string(),
            birth_date: value.birth_date.as_deref().and_then(parse_birth_date),
            gender: value.gender,
            citizenship: value.citizenship.filter(|s| !s.trim().is_empty()),
            document_reference: value.document_reference.filter(|s| !s.trim().is_empty()),
            relation: value.relation,
            income: value.income.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandPlotSubmission {
    pub kind: String,
    #[serde(deserialize_with = "lenient_number")]
    pub area: f64,
    pub unit: LandUnit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LivestockSubmission {
    pub kind: String,
    #[serde(deserialize_with = "lenient_number")]
    pub count: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleSubmission {
    pub kind: VehicleKind,
    #[serde(deserialize_with = "lenient_year")]
    pub model_year: Option<i32>,
    pub model: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialAssetSubmission {
    pub kind: String,
    #[serde(deserialize_with = "lenient_number")]
    pub principal: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub annual_rate_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeRecordSubmission {
    pub category: String,
    #[serde(deserialize_with = "lenient_number")]
    pub amount: f64,
    pub periodicity: Periodicity,
    pub source: String,
    pub period: Option<String>,
}

impl From<IncomeRecordSubmission> for IncomeRecord {
    fn from(value: IncomeRecordSubmission) -> Self {
        Self {
            category: value.category.trim().to_lowercase(),
            amount: value.amount,
            periodicity: value.periodicity,
            source: value.source.trim().to_string(),
            period: value.period.filter(|period| !period.trim().is_empty()),
        }
    }
}

/// Household snapshot as received from the form layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseholdSubmission {
    pub applicant: MemberSubmission,
    pub members: Vec<MemberSubmission>,
    pub land_plots: Vec<LandPlotSubmission>,
    pub livestock: Vec<LivestockSubmission>,
    pub vehicles: Vec<VehicleSubmission>,
    pub financial_assets: Vec<FinancialAssetSubmission>,
    pub income_records: Vec<IncomeRecordSubmission>,
}

impl From<HouseholdSubmission> for Household {
    fn from(value: HouseholdSubmission) -> Self {
        let mut household = Household::new(value.applicant.into());
        household.members = value.members.into_iter().map(FamilyMember::from).collect();
        household.land_plots = value
            .land_plots
            .into_iter()
            .map(|plot| LandPlot {
                kind: plot.kind,
                area: plot.area,
                unit: plot.unit,
            })
            .collect();
        household.livestock = value
            .livestock
            .into_iter()
            .map(|entry| LivestockEntry {
                kind: entry.kind.trim().to_lowercase(),
                count: entry.count.floor().min(u32::MAX as f64) as u32,
            })
            .collect();
        household.vehicles = value
            .vehicles
            .into_iter()
            .map(|vehicle| Vehicle {
                kind: vehicle.kind,
                model_year: vehicle.model_year,
                model: vehicle.model,
            })
            .collect();
        household.financial_assets = value
            .financial_assets
            .into_iter()
            .map(|asset| FinancialAsset {
                kind: asset.kind,
                principal: asset.principal,
                annual_rate_pct: asset.annual_rate_pct,
            })
            .collect();
        household.income_records = value
            .income_records
            .into_iter()
            .map(IncomeRecord::from)
            .collect();
        household
    }
}
