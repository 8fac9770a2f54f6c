//! Bill layouts: one rule set per supported bill format.

use lazy_static::lazy_static;
use regex::Regex;

use super::patterns::*;
use super::rules::{FieldRule, MatchStrategy, Normalizer};
use crate::models::bill::{Field, ReadingColumn, ReadingType};
use crate::table::TableSpec;

/// Name of the consumption table in [`CSG`] rules.
pub const CONSUMPTION_TABLE: &str = "consumption";

/// Consumption details table ("电量信息").
///
/// Flat-rate bills list 有功总 and 无功总 rows; time-of-use bills list
/// 尖, 峰, 平, 谷 and 无功总. 尖峰调整电量 only appears on time-of-use bills,
/// where 尖 and 峰 rows may still leave it out.
pub const CONSUMPTION: TableSpec = TableSpec {
    name: CONSUMPTION_TABLE,
    header_keywords: &["表计资产编号", "示数类型"],
    columns: &[
        "表计资产编号",
        "示数类型",
        "上次表示数",
        "本次表示数",
        "倍率",
        "抄见电量",
        "换表电量",
        "退补电量",
        "变线损电量",
        "公摊电量",
        "免费电量",
        "分表电量",
        "尖峰调整电量",
        "合计电量",
    ],
    label_column: 1,
    row_labels: &["有功总", "无功总", "尖", "峰", "平", "谷"],
    omitted: &[
        ("有功总", &["尖峰调整电量"]),
        ("无功总", &["免费电量", "尖峰调整电量"]),
        ("平", &["尖峰调整电量"]),
        ("谷", &["尖峰调整电量"]),
    ],
};

/// Row that carries the meter identity: 有功总 on flat bills, 平 on time-of-use bills.
const METER_ROWS: &[&str] = &["有功总", "平"];

/// A supported bill format.
#[derive(Debug, Clone)]
pub struct BillLayout {
    /// Short name used in configuration.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Header that identifies a bill of this layout.
    pub signature: &'static Regex,
    /// Tables the loader must detect for the rules.
    pub tables: &'static [TableSpec],
    /// Rules in application order.
    pub rules: Vec<FieldRule>,
}

lazy_static! {
    /// China Southern Power Grid electricity bill notice (电费通知单).
    pub static ref CSG: BillLayout = BillLayout {
        name: "csg",
        description: "China Southern Power Grid electricity bill notice",
        signature: &CSG_SIGNATURE,
        tables: &[CONSUMPTION],
        rules: vec![
            FieldRule::new(Field::Customer, MatchStrategy::Pattern(&CUSTOMER), Normalizer::Text),
            FieldRule::new(Field::CustomerNumber, MatchStrategy::Pattern(&CUSTOMER_NUMBER), Normalizer::Identifier),
            FieldRule::new(Field::SettlementAccount, MatchStrategy::Pattern(&SETTLEMENT_ACCOUNT), Normalizer::Identifier),
            FieldRule::new(Field::SettlementAccountName, MatchStrategy::Pattern(&SETTLEMENT_ACCOUNT_NAME), Normalizer::Text),
            FieldRule::new(Field::MeteringPoint, MatchStrategy::Pattern(&METERING_POINT), Normalizer::Identifier),
            FieldRule::new(Field::MarketClassification, MatchStrategy::Pattern(&MARKET_CLASSIFICATION), Normalizer::Text),
            FieldRule::new(Field::UsageCategory, MatchStrategy::Pattern(&USAGE_CATEGORY), Normalizer::Text),
            FieldRule::new(Field::PeriodStart, MatchStrategy::Pattern(&PERIOD_START), Normalizer::Date),
            FieldRule::new(Field::PeriodEnd, MatchStrategy::Pattern(&PERIOD_END), Normalizer::Date),
            FieldRule::new(
                Field::MeterAssetNumber,
                MatchStrategy::TableCell { table: CONSUMPTION_TABLE, rows: METER_ROWS, column: "表计资产编号" },
                Normalizer::Identifier,
            ),
            FieldRule::new(
                Field::Multiplier,
                MatchStrategy::TableCell { table: CONSUMPTION_TABLE, rows: METER_ROWS, column: "倍率" },
                Normalizer::Quantity,
            ),
            FieldRule::new(
                Field::TotalActiveEnergy,
                MatchStrategy::TableSum {
                    table: CONSUMPTION_TABLE,
                    groups: &[&["有功总"], &["尖", "峰", "平", "谷"]],
                    column: "合计电量",
                },
                Normalizer::Quantity,
            ),
            FieldRule::new(
                Field::TotalReactiveEnergy,
                MatchStrategy::TableCell { table: CONSUMPTION_TABLE, rows: &["无功总"], column: "合计电量" },
                Normalizer::Quantity,
            ),
            FieldRule::new(Field::AmountDueInWords, MatchStrategy::Pattern(&AMOUNT_DUE_IN_WORDS), Normalizer::Text),
            FieldRule::new(Field::AmountDue, MatchStrategy::Pattern(&AMOUNT_DUE), Normalizer::Amount),
            FieldRule::new(Field::AveragePrice, MatchStrategy::Pattern(&AVERAGE_PRICE), Normalizer::Quantity),
        ]
        .into_iter()
        .chain(reading_rules(CONSUMPTION_TABLE))
        .collect(),
    };
}

/// One rule per consumption table cell a bill variant may carry.
fn reading_rules(table: &'static str) -> impl Iterator<Item = FieldRule> {
    ReadingType::ALL.into_iter().flat_map(move |reading| {
        reading.columns().iter().map(move |&column| {
            let normalizer = match column {
                ReadingColumn::AssetNumber => Normalizer::Identifier,
                _ => Normalizer::Quantity,
            };
            FieldRule::new(
                Field::Reading(reading, column),
                MatchStrategy::RowCell { table, row: reading.label(), column: column.label() },
                normalizer,
            )
        })
    })
}

/// All built-in layouts.
pub fn layouts() -> Vec<&'static BillLayout> {
    vec![&*CSG]
}

/// Look up a layout by its configuration name.
pub fn layout_by_name(name: &str) -> Option<&'static BillLayout> {
    layouts().into_iter().find(|l| l.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csg_covers_every_field_once() {
        let fields: Vec<Field> = CSG.rules.iter().map(|r| r.field).collect();
        assert_eq!(fields, Field::all().to_vec());
    }

    #[test]
    fn test_layout_lookup() {
        assert_eq!(layout_by_name("CSG").map(|l| l.name), Some("csg"));
        assert!(layout_by_name("sgcc").is_none());
    }

    #[test]
    fn test_reading_columns_are_table_columns() {
        for reading in ReadingType::ALL {
            assert!(CONSUMPTION.row_labels.contains(&reading.label()));
            for column in reading.columns() {
                assert!(CONSUMPTION.columns.contains(&column.label()), "{}", column.label());
            }
        }
    }
}
