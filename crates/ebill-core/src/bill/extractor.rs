//! Rule-based bill extraction.

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::layout::BillLayout;
use super::rules::FieldMismatch;
use super::{BillExtractor, Result};
use crate::document::BillDocument;
use crate::error::ExtractionError;
use crate::models::bill::BillRecord;

/// Result of extracting one bill.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    /// The extracted record.
    pub record: BillRecord,
    /// Fields left empty, with the reason.
    pub mismatches: Vec<FieldMismatch>,
}

impl Extraction {
    /// Whether every rule produced a value.
    pub fn is_complete(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Applies a [`BillLayout`]'s rules in order.
pub struct RuleExtractor {
    layout: &'static BillLayout,
    /// Reject text without the layout's signature.
    require_signature: bool,
}

impl RuleExtractor {
    /// Create an extractor for a layout, with the signature check on.
    pub fn new(layout: &'static BillLayout) -> Self {
        Self {
            layout,
            require_signature: true,
        }
    }

    /// Set the signature check.
    pub fn with_signature_check(mut self, require: bool) -> Self {
        self.require_signature = require;
        self
    }

    /// Apply the rules to the text of a single bill.
    pub fn extract_bill(&self, bill: &BillDocument) -> Result<Extraction> {
        let file = bill.file_name();
        let mut record = BillRecord::new(file.clone());
        let mut mismatches = Vec::new();

        for rule in &self.layout.rules {
            match rule.apply(bill) {
                Ok(Some(value)) => {
                    if !record.set(rule.field, value) {
                        // Rule tables pair each field with a normalizer of its kind.
                        warn!("{}: {} produced a value of the wrong type", file, rule.field);
                    }
                }
                Ok(None) => trace!("{}: {} not on this bill", file, rule.field),
                Err(mismatch) => {
                    warn!("{}: field {}", file, mismatch);
                    mismatches.push(mismatch);
                }
            }
        }

        if record.populated() == 0 {
            return Err(ExtractionError::NoFields);
        }

        info!(
            "{}: extracted {}/{} fields",
            file,
            record.populated(),
            self.layout.rules.len()
        );

        Ok(Extraction { record, mismatches })
    }
}

impl BillExtractor for RuleExtractor {
    fn extract(&self, document: &BillDocument) -> Result<Vec<Extraction>> {
        let file = document.file_name();

        if self.require_signature && !self.layout.signature.is_match(&document.text) {
            debug!("{}: no {} signature", file, self.layout.name);
            return Err(ExtractionError::NotABill);
        }

        let bills = document.split_bills(self.layout.signature, self.layout.tables);
        if bills.len() == 1 {
            return self.extract_bill(&bills[0]).map(|extraction| vec![extraction]);
        }

        info!("{}: {} bills", file, bills.len());
        let mut extractions = Vec::with_capacity(bills.len());
        for (number, bill) in (1..).zip(&bills) {
            match self.extract_bill(bill) {
                Ok(extraction) => extractions.push(extraction),
                Err(e) => warn!("{}: bill {} of {}: {}", file, number, bills.len(), e),
            }
        }

        if extractions.is_empty() {
            return Err(ExtractionError::NoFields);
        }
        Ok(extractions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bill::layout::CSG;
    use crate::bill::rules::MismatchReason;
    use crate::models::bill::{Field, FieldValue, ReadingColumn, ReadingType};
    use crate::pdf::PdfPage;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const FLAT_BILL: &str = "\
中国南方电网公司 广东电网公司 电费通知单
尊敬的：某某科技有限公司
用户编号：0300012345678 结算户号：0300087654321
结算户名：某某科技有限公司 计量点编号：000123456
基本信息
市场化属性分类：直接交易 用电类别：大工业用电
用电开始时间：20240301 用电结束时间：20240331
电量信息
表计资产编号 示数类型 上次表示数 本次表示数 倍率抄见电量
 (千瓦时)换表电量
 (千瓦时)退补电量
 (千瓦时)变/线损
电量公摊电量
 (千瓦时)免费电量
 (千瓦时)分表电量
 (千瓦时)合计电量
 (千瓦时)
0300SG0012345 有功总 1200.50 1300.50 80 8000.00 0.00 0.00 120.00 0.00 0.00 0.00 8120.00
0300SG0012345 无功总 300.00 320.00 80 1600.00 0.00 0.00 24.00 0.00 0.00 1624.00
电费信息
(1)应收电费合计（大写）：伍仟肆佰叁拾贰元壹角整
应收电费合计（小写）：5,432.10 元
平均电价：0.6690 (元/千瓦时)
";

    const TIME_OF_USE_BILL: &str = "\
中国南方电网公司 广西电网公司 电费通知单
尊敬的：某某制造厂
用户编号：0400011112222 结算户号：0400033334444
结算户名：某某制造厂 计量点编号：000765432
市场化属性分类：代理购电 用电类别：一般工商业
用电开始时间：2024-04-01 用电结束时间：2024-04-30
表计资产编号 示数类型 上次表示数 本次表示数 倍率抄见电量(千瓦时) 换表电量(千瓦时) 退补电量(千瓦时) 变/线损电量(千瓦时) 公摊电量(千瓦时) 免费电量(千瓦时) 分表电量(千瓦时) 尖峰调整电量(千瓦时) 合计电量(千瓦时)
0400SG
0099887 尖 10.00 12.00 100 200.00 0.00 0.00 0.00 0.00 0.00 0.00 5.00 205.00
0400SG0099887 峰 50.00 58.00 100 800.00 0.00 0.00 0.00 0.00 0.00 0.00 -5.00 795.00
0400SG0099887 平 70.00 80.00 100 1000.00 0.00 0.00 0.00 0.00 0.00 0.00 1000.00
0400SG0099887 谷 30.00 36.00 100 600.00 0.00 0.00 0.00 0.00 0.00 0.00 600.00
0400SG0099887 无功总 5.00 6.00 100 100.00 0.00 0.00 0.00 0.00 0.00 100.00
应收电费合计（大写）：壹仟柒佰元整
应收电费合计（小写）：1700.00元
平均电价：0.6071(元/千瓦时)
";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn extract(text: &str) -> Result<Extraction> {
        let document = BillDocument::from_text("bill.pdf", text, CSG.tables);
        let mut extractions = RuleExtractor::new(&CSG).extract(&document)?;
        assert_eq!(extractions.len(), 1);
        Ok(extractions.remove(0))
    }

    fn missing_summary(record: &BillRecord) -> Vec<Field> {
        record.missing_fields().into_iter().filter(|f| !f.is_reading()).collect()
    }

    fn reading(record: &BillRecord, reading: ReadingType, column: ReadingColumn) -> Option<Decimal> {
        record.decimal(Field::Reading(reading, column))
    }

    #[test]
    fn test_flat_bill_populates_every_field() {
        let extraction = extract(FLAT_BILL).unwrap();
        let record = &extraction.record;

        assert_eq!(extraction.mismatches, vec![]);
        assert_eq!(missing_summary(record), vec![]);
        assert_eq!(record.file, "bill.pdf");
        assert_eq!(record.text(Field::Customer), Some("某某科技有限公司"));
        assert_eq!(record.text(Field::CustomerNumber), Some("0300012345678"));
        assert_eq!(record.text(Field::SettlementAccount), Some("0300087654321"));
        assert_eq!(record.text(Field::MeteringPoint), Some("000123456"));
        assert_eq!(record.text(Field::UsageCategory), Some("大工业用电"));
        assert_eq!(record.date(Field::PeriodStart), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(record.date(Field::PeriodEnd), NaiveDate::from_ymd_opt(2024, 3, 31));
        assert_eq!(record.text(Field::MeterAssetNumber), Some("0300SG0012345"));
        assert_eq!(record.decimal(Field::Multiplier), Some(dec("80")));
        assert_eq!(record.decimal(Field::TotalActiveEnergy), Some(dec("8120.00")));
        assert_eq!(record.decimal(Field::TotalReactiveEnergy), Some(dec("1624.00")));
        assert_eq!(record.text(Field::AmountDueInWords), Some("伍仟肆佰叁拾贰元壹角整"));
        assert_eq!(record.decimal(Field::AmountDue), Some(dec("5432.10")));
        assert_eq!(record.decimal(Field::AveragePrice), Some(dec("0.6690")));
    }

    #[test]
    fn test_flat_bill_readings() {
        let record = extract(FLAT_BILL).unwrap().record;

        assert_eq!(
            record.text(Field::Reading(ReadingType::Active, ReadingColumn::AssetNumber)),
            Some("0300SG0012345")
        );
        assert_eq!(reading(&record, ReadingType::Active, ReadingColumn::PreviousReading), Some(dec("1200.50")));
        assert_eq!(reading(&record, ReadingType::Active, ReadingColumn::CurrentReading), Some(dec("1300.50")));
        assert_eq!(reading(&record, ReadingType::Active, ReadingColumn::MeteredEnergy), Some(dec("8000.00")));
        assert_eq!(reading(&record, ReadingType::Active, ReadingColumn::LossEnergy), Some(dec("120.00")));
        // 无功总 has no 免费电量 column; the cells after it stay aligned.
        assert_eq!(reading(&record, ReadingType::Reactive, ReadingColumn::LossEnergy), Some(dec("24.00")));
        assert_eq!(reading(&record, ReadingType::Reactive, ReadingColumn::SubMeterEnergy), Some(dec("0.00")));
        assert_eq!(reading(&record, ReadingType::Sharp, ReadingColumn::TotalEnergy), None);
    }

    #[test]
    fn test_time_of_use_readings() {
        let extraction = extract(TIME_OF_USE_BILL).unwrap();
        let record = &extraction.record;

        assert_eq!(extraction.mismatches, vec![]);
        assert_eq!(reading(record, ReadingType::Sharp, ReadingColumn::CurrentReading), Some(dec("12.00")));
        assert_eq!(reading(record, ReadingType::Sharp, ReadingColumn::PeakAdjustment), Some(dec("5.00")));
        assert_eq!(reading(record, ReadingType::Peak, ReadingColumn::PeakAdjustment), Some(dec("-5.00")));
        assert_eq!(reading(record, ReadingType::Peak, ReadingColumn::TotalEnergy), Some(dec("795.00")));
        assert_eq!(reading(record, ReadingType::Flat, ReadingColumn::SubMeterEnergy), Some(dec("0.00")));
        assert_eq!(reading(record, ReadingType::Valley, ReadingColumn::TotalEnergy), Some(dec("600.00")));
        assert_eq!(reading(record, ReadingType::Valley, ReadingColumn::Multiplier), Some(dec("100")));
        assert_eq!(reading(record, ReadingType::Active, ReadingColumn::PreviousReading), None);
    }

    #[test]
    fn test_sharp_row_without_adjustment() {
        let text = TIME_OF_USE_BILL.replace(
            "0099887 尖 10.00 12.00 100 200.00 0.00 0.00 0.00 0.00 0.00 0.00 5.00 205.00",
            "0099887 尖 10.00 12.00 100 200.00 0.00 0.00 0.00 0.00 0.00 0.00 200.00",
        );
        let extraction = extract(&text).unwrap();
        let record = &extraction.record;

        assert!(extraction.is_complete());
        assert_eq!(reading(record, ReadingType::Sharp, ReadingColumn::PeakAdjustment), None);
        assert_eq!(reading(record, ReadingType::Sharp, ReadingColumn::TotalEnergy), Some(dec("200.00")));
        assert_eq!(record.decimal(Field::TotalActiveEnergy), Some(dec("2595.00")));
    }

    #[test]
    fn test_each_bill_in_a_document_is_separate() {
        let first = FLAT_BILL
            .replace("尊敬的：某某科技有限公司", "尊敬的：甲公司")
            .replace("平均电价：0.6690 (元/千瓦时)", "");
        let second = FLAT_BILL
            .replace("尊敬的：某某科技有限公司", "尊敬的：乙公司")
            .replace("用户编号：0300012345678", "用户编号：0300000002")
            .replace("0.6690", "0.9999");
        let pages = vec![
            PdfPage { number: 1, text: first },
            PdfPage { number: 2, text: second },
        ];
        let document = BillDocument::from_pages("two.pdf", pages, CSG.tables);

        let extractions = RuleExtractor::new(&CSG).extract(&document).unwrap();
        assert_eq!(extractions.len(), 2);

        let (a, b) = (&extractions[0], &extractions[1]);
        assert_eq!(a.record.text(Field::Customer), Some("甲公司"));
        assert_eq!(a.record.text(Field::CustomerNumber), Some("0300012345678"));
        assert_eq!(a.record.decimal(Field::AveragePrice), None);
        assert_eq!(a.mismatches.len(), 1);
        assert_eq!(a.mismatches[0].field, Field::AveragePrice);

        assert_eq!(b.record.text(Field::Customer), Some("乙公司"));
        assert_eq!(b.record.text(Field::CustomerNumber), Some("0300000002"));
        assert_eq!(b.record.decimal(Field::AveragePrice), Some(dec("0.9999")));
        assert!(b.is_complete());
        assert_eq!(b.record.file, "two.pdf");
    }

    #[test]
    fn test_time_of_use_bill_sums_active_energy() {
        let extraction = extract(TIME_OF_USE_BILL).unwrap();
        let record = &extraction.record;

        assert!(extraction.is_complete());
        assert_eq!(record.decimal(Field::TotalActiveEnergy), Some(dec("2600.00")));
        assert_eq!(record.decimal(Field::TotalReactiveEnergy), Some(dec("100.00")));
        assert_eq!(record.text(Field::MeterAssetNumber), Some("0400SG0099887"));
        assert_eq!(record.decimal(Field::Multiplier), Some(dec("100")));
        assert_eq!(record.date(Field::PeriodStart), NaiveDate::from_ymd_opt(2024, 4, 1));
        assert_eq!(record.decimal(Field::AmountDue), Some(dec("1700.00")));
    }

    #[test]
    fn test_missing_field_is_isolated() {
        let text = FLAT_BILL.replace("平均电价：0.6690 (元/千瓦时)", "");
        let extraction = extract(&text).unwrap();

        assert_eq!(missing_summary(&extraction.record), vec![Field::AveragePrice]);
        assert_eq!(extraction.mismatches.len(), 1);
        assert_eq!(extraction.mismatches[0].reason, MismatchReason::NoMatch);
        assert_eq!(
            extraction.record.get(Field::AmountDue),
            Some(&FieldValue::Decimal(dec("5432.10")))
        );
    }

    #[test]
    fn test_unparseable_date_is_a_mismatch() {
        let text = FLAT_BILL.replace("用电结束时间：20240331", "用电结束时间：20241331");
        let extraction = extract(&text).unwrap();

        assert_eq!(missing_summary(&extraction.record), vec![Field::PeriodEnd]);
        assert_eq!(
            extraction.mismatches[0].reason,
            MismatchReason::Invalid { value: "20241331".into() }
        );
    }

    #[test]
    fn test_text_without_signature_is_not_a_bill() {
        let text = FLAT_BILL.replace("中国南方电网公司 广东电网公司 电费通知单", "");
        assert!(matches!(extract(&text), Err(ExtractionError::NotABill)));

        let document = BillDocument::from_text("bill.pdf", &text, CSG.tables);
        let extractions = RuleExtractor::new(&CSG)
            .with_signature_check(false)
            .extract(&document)
            .unwrap();
        assert_eq!(extractions.len(), 1);
        assert!(extractions[0].is_complete());
    }

    #[test]
    fn test_no_matching_fields_is_unreadable() {
        let text = "中国南方电网公司 广东电网公司 电费通知单\n本页无内容";
        assert!(matches!(extract(text), Err(ExtractionError::NoFields)));
    }

    #[test]
    fn test_missing_reactive_row_is_isolated() {
        let text = FLAT_BILL.replace(
            "0300SG0012345 无功总 300.00 320.00 80 1600.00 0.00 0.00 24.00 0.00 0.00 1624.00\n",
            "",
        );
        let extraction = extract(&text).unwrap();
        let record = &extraction.record;

        assert_eq!(missing_summary(record), vec![Field::TotalReactiveEnergy]);
        assert_eq!(extraction.mismatches.len(), 1);
        assert_eq!(extraction.mismatches[0].field, Field::TotalReactiveEnergy);
        assert_eq!(record.decimal(Field::TotalActiveEnergy), Some(dec("8120.00")));
        assert_eq!(reading(record, ReadingType::Reactive, ReadingColumn::CurrentReading), None);
    }
}
