//! Bill record model: the fixed field set and its typed values.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Declared type of a bill field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text or identifier.
    Text,
    /// Calendar date (canonical `YYYY-MM-DD`).
    Date,
    /// Decimal amount or quantity.
    Decimal,
}

/// Reading type of a consumption table row (示数类型).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadingType {
    /// 有功总, flat-rate bills only.
    Active,
    /// 无功总
    Reactive,
    /// 尖
    Sharp,
    /// 峰
    Peak,
    /// 平
    Flat,
    /// 谷
    Valley,
}

impl ReadingType {
    pub const ALL: [ReadingType; 6] = [
        ReadingType::Active,
        ReadingType::Reactive,
        ReadingType::Sharp,
        ReadingType::Peak,
        ReadingType::Flat,
        ReadingType::Valley,
    ];

    /// Row label in the consumption table.
    pub fn label(self) -> &'static str {
        match self {
            ReadingType::Active => "有功总",
            ReadingType::Reactive => "无功总",
            ReadingType::Sharp => "尖",
            ReadingType::Peak => "峰",
            ReadingType::Flat => "平",
            ReadingType::Valley => "谷",
        }
    }

    /// Columns exported for this row, in column order.
    ///
    /// The 合计电量 of 有功总 and 无功总 rows are the
    /// [`Field::TotalActiveEnergy`] and [`Field::TotalReactiveEnergy`] columns.
    pub fn columns(self) -> &'static [ReadingColumn] {
        use ReadingColumn::*;
        match self {
            ReadingType::Active => &[
                AssetNumber, PreviousReading, CurrentReading, Multiplier, MeteredEnergy,
                ReplacementEnergy, RefundEnergy, LossEnergy, SharedEnergy, FreeEnergy,
                SubMeterEnergy,
            ],
            ReadingType::Reactive => &[
                AssetNumber, PreviousReading, CurrentReading, Multiplier, MeteredEnergy,
                ReplacementEnergy, RefundEnergy, LossEnergy, SharedEnergy, SubMeterEnergy,
            ],
            ReadingType::Sharp | ReadingType::Peak => &ReadingColumn::ALL,
            ReadingType::Flat | ReadingType::Valley => &[
                AssetNumber, PreviousReading, CurrentReading, Multiplier, MeteredEnergy,
                ReplacementEnergy, RefundEnergy, LossEnergy, SharedEnergy, FreeEnergy,
                SubMeterEnergy, TotalEnergy,
            ],
        }
    }
}

/// Column of the consumption table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadingColumn {
    AssetNumber,
    PreviousReading,
    CurrentReading,
    Multiplier,
    MeteredEnergy,
    ReplacementEnergy,
    RefundEnergy,
    LossEnergy,
    SharedEnergy,
    FreeEnergy,
    SubMeterEnergy,
    PeakAdjustment,
    TotalEnergy,
}

impl ReadingColumn {
    pub const ALL: [ReadingColumn; 13] = [
        ReadingColumn::AssetNumber,
        ReadingColumn::PreviousReading,
        ReadingColumn::CurrentReading,
        ReadingColumn::Multiplier,
        ReadingColumn::MeteredEnergy,
        ReadingColumn::ReplacementEnergy,
        ReadingColumn::RefundEnergy,
        ReadingColumn::LossEnergy,
        ReadingColumn::SharedEnergy,
        ReadingColumn::FreeEnergy,
        ReadingColumn::SubMeterEnergy,
        ReadingColumn::PeakAdjustment,
        ReadingColumn::TotalEnergy,
    ];

    /// Column label in the consumption table header, units removed.
    pub fn label(self) -> &'static str {
        match self {
            ReadingColumn::AssetNumber => "表计资产编号",
            ReadingColumn::PreviousReading => "上次表示数",
            ReadingColumn::CurrentReading => "本次表示数",
            ReadingColumn::Multiplier => "倍率",
            ReadingColumn::MeteredEnergy => "抄见电量",
            ReadingColumn::ReplacementEnergy => "换表电量",
            ReadingColumn::RefundEnergy => "退补电量",
            ReadingColumn::LossEnergy => "变线损电量",
            ReadingColumn::SharedEnergy => "公摊电量",
            ReadingColumn::FreeEnergy => "免费电量",
            ReadingColumn::SubMeterEnergy => "分表电量",
            ReadingColumn::PeakAdjustment => "尖峰调整电量",
            ReadingColumn::TotalEnergy => "合计电量",
        }
    }
}

lazy_static! {
    // "有功总上次表示数", "尖合计电量", ...
    static ref READING_HEADERS: [[String; 13]; 6] = std::array::from_fn(|t| {
        std::array::from_fn(|c| {
            format!("{}{}", ReadingType::ALL[t].label(), ReadingColumn::ALL[c].label())
        })
    });

    static ref ALL_FIELDS: Vec<Field> = Field::SUMMARY
        .into_iter()
        .chain(ReadingType::ALL.into_iter().flat_map(|reading| {
            reading
                .columns()
                .iter()
                .map(move |column| Field::Reading(reading, *column))
        }))
        .collect();
}

/// A named field extracted from an electricity bill.
///
/// Declaration order is the CSV column order: the bill summary fields,
/// then one field per consumption table row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Field {
    /// Customer name (用户).
    Customer,
    /// Customer number (用户编号).
    CustomerNumber,
    /// Settlement account number (结算户号).
    SettlementAccount,
    /// Settlement account name (结算户名).
    SettlementAccountName,
    /// Metering point number (计量点编号).
    MeteringPoint,
    /// Market attribute classification (市场化属性分类).
    MarketClassification,
    /// Electricity usage category (用电类别).
    UsageCategory,
    /// First day of the billing period (用电开始时间).
    PeriodStart,
    /// Last day of the billing period (用电结束时间).
    PeriodEnd,
    /// Meter asset number (表计资产编号).
    MeterAssetNumber,
    /// Meter multiplier (倍率).
    Multiplier,
    /// Total active energy in kWh (有功总合计电量).
    TotalActiveEnergy,
    /// Total reactive energy (无功总合计电量).
    TotalReactiveEnergy,
    /// Amount due written in Chinese numerals (应收电费合计大写).
    AmountDueInWords,
    /// Amount due in yuan (应收电费合计).
    AmountDue,
    /// Average price in yuan per kWh (平均电价).
    AveragePrice,
    /// One cell of the consumption table, e.g. 尖本次表示数.
    Reading(ReadingType, ReadingColumn),
}

impl Field {
    /// Bill summary fields, in column order.
    pub const SUMMARY: [Field; 16] = [
        Field::Customer,
        Field::CustomerNumber,
        Field::SettlementAccount,
        Field::SettlementAccountName,
        Field::MeteringPoint,
        Field::MarketClassification,
        Field::UsageCategory,
        Field::PeriodStart,
        Field::PeriodEnd,
        Field::MeterAssetNumber,
        Field::Multiplier,
        Field::TotalActiveEnergy,
        Field::TotalReactiveEnergy,
        Field::AmountDueInWords,
        Field::AmountDue,
        Field::AveragePrice,
    ];

    /// Every output field, in column order.
    pub fn all() -> &'static [Field] {
        &ALL_FIELDS
    }

    /// Whether the field is a consumption table cell.
    pub fn is_reading(self) -> bool {
        matches!(self, Field::Reading(..))
    }

    /// Column header as printed on the bill.
    pub fn header(self) -> &'static str {
        match self {
            Field::Customer => "用户",
            Field::CustomerNumber => "用户编号",
            Field::SettlementAccount => "结算户号",
            Field::SettlementAccountName => "结算户名",
            Field::MeteringPoint => "计量点编号",
            Field::MarketClassification => "市场化属性分类",
            Field::UsageCategory => "用电类别",
            Field::PeriodStart => "用电开始时间",
            Field::PeriodEnd => "用电结束时间",
            Field::MeterAssetNumber => "表计资产编号",
            Field::Multiplier => "倍率",
            Field::TotalActiveEnergy => "有功总合计电量",
            Field::TotalReactiveEnergy => "无功总合计电量",
            Field::AmountDueInWords => "应收电费合计大写",
            Field::AmountDue => "应收电费合计",
            Field::AveragePrice => "平均电价",
            Field::Reading(reading, column) => {
                READING_HEADERS[reading as usize][column as usize].as_str()
            }
        }
    }

    /// Declared value type.
    pub fn kind(self) -> FieldKind {
        match self {
            Field::PeriodStart | Field::PeriodEnd => FieldKind::Date,
            Field::Multiplier
            | Field::TotalActiveEnergy
            | Field::TotalReactiveEnergy
            | Field::AmountDue
            | Field::AveragePrice => FieldKind::Decimal,
            Field::Reading(_, ReadingColumn::AssetNumber) => FieldKind::Text,
            Field::Reading(..) => FieldKind::Decimal,
            _ => FieldKind::Text,
        }
    }

    /// Look a field up by its column header.
    pub fn from_header(header: &str) -> Option<Field> {
        Field::all().iter().copied().find(|f| f.header() == header)
    }
}

impl From<Field> for String {
    fn from(field: Field) -> Self {
        field.header().to_string()
    }
}

impl TryFrom<String> for Field {
    type Error = String;

    fn try_from(header: String) -> Result<Self, Self::Error> {
        Field::from_header(&header).ok_or_else(|| format!("unknown field {:?}", header))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// A normalized field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Decimal(Decimal),
}

impl FieldValue {
    /// The type this value carries.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Date(_) => FieldKind::Date,
            FieldValue::Decimal(_) => FieldKind::Decimal,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Decimal(d) => write!(f, "{}", d),
        }
    }
}

/// One normalized output row: the fields extracted from a single bill document.
///
/// Fields that were not matched are absent and render as empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillRecord {
    /// File name of the source document.
    pub file: String,

    values: BTreeMap<Field, FieldValue>,
}

impl BillRecord {
    /// Create an empty record for a source file.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            values: BTreeMap::new(),
        }
    }

    /// Set a field. Returns `false` (and leaves the record unchanged) when the
    /// value type does not match the field's declared kind.
    pub fn set(&mut self, field: Field, value: FieldValue) -> bool {
        if value.kind() != field.kind() {
            return false;
        }
        self.values.insert(field, value);
        true
    }

    /// Builder form of [`BillRecord::set`] for literals in tests and fixtures.
    pub fn with(mut self, field: Field, value: FieldValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn text(&self, field: Field) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn date(&self, field: Field) -> Option<NaiveDate> {
        self.get(field).and_then(FieldValue::as_date)
    }

    pub fn decimal(&self, field: Field) -> Option<Decimal> {
        self.get(field).and_then(FieldValue::as_decimal)
    }

    /// Fields with no value, in column order.
    ///
    /// Consumption rows a bill variant does not carry count as missing.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::all()
            .iter()
            .copied()
            .filter(|f| !self.values.contains_key(f))
            .collect()
    }

    /// Number of populated fields.
    pub fn populated(&self) -> usize {
        self.values.len()
    }

    /// Render the record as CSV cells, file name first.
    pub fn to_row(&self) -> Vec<String> {
        std::iter::once(self.file.clone())
            .chain(
                Field::all()
                    .iter()
                    .map(|f| self.get(*f).map(|v| v.to_string()).unwrap_or_default()),
            )
            .collect()
    }
}
