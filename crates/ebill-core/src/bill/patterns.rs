//! Regex patterns for China Southern Power Grid electricity bills.
//!
//! Patterns run against text cleaned by [`crate::text::normalize`]: ASCII
//! colons and parentheses, single spaces. Each field pattern exposes its
//! value as the `value` capture group.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Notice header: "中国南方电网公司 广东电网公司 电费通知单"
    pub static ref CSG_SIGNATURE: Regex = Regex::new(
        r"中国南方电网公司 ?\w+电网公司 ?电费通知单"
    ).unwrap();

    // Basic information
    pub static ref CUSTOMER: Regex = Regex::new(
        r"尊敬的: ?(?P<value>[\w()·\-]+)"
    ).unwrap();

    pub static ref CUSTOMER_NUMBER: Regex = Regex::new(
        r"用户编号: ?(?P<value>\w+)"
    ).unwrap();

    pub static ref SETTLEMENT_ACCOUNT: Regex = Regex::new(
        r"结算户号: ?(?P<value>\w+)"
    ).unwrap();

    pub static ref SETTLEMENT_ACCOUNT_NAME: Regex = Regex::new(
        r"结算户名: ?(?P<value>[\w()·\-]+)"
    ).unwrap();

    pub static ref METERING_POINT: Regex = Regex::new(
        r"计量点编号: ?(?P<value>\w+)"
    ).unwrap();

    pub static ref MARKET_CLASSIFICATION: Regex = Regex::new(
        r"市场化属性分类: ?(?P<value>\w+)"
    ).unwrap();

    pub static ref USAGE_CATEGORY: Regex = Regex::new(
        r"用电类别: ?(?P<value>\w+)"
    ).unwrap();

    pub static ref PERIOD_START: Regex = Regex::new(
        r"用电开始时间: ?(?P<value>\d{4}[-/年]?\d{1,2}[-/月]?\d{1,2}日?)"
    ).unwrap();

    pub static ref PERIOD_END: Regex = Regex::new(
        r"用电结束时间: ?(?P<value>\d{4}[-/年]?\d{1,2}[-/月]?\d{1,2}日?)"
    ).unwrap();

    // Bill information
    pub static ref AMOUNT_DUE_IN_WORDS: Regex = Regex::new(
        r"应收电费合计\(大写\): ?(?P<value>\w+)"
    ).unwrap();

    pub static ref AMOUNT_DUE: Regex = Regex::new(
        r"应收电费合计\(小写\): ?(?P<value>[¥￥]?-?[\d,]+(?:\.\d+)?) ?元"
    ).unwrap();

    pub static ref AVERAGE_PRICE: Regex = Regex::new(
        r"平均电价: ?(?P<value>-?[\d.]+) ?\(元/千瓦时\)"
    ).unwrap();
}
