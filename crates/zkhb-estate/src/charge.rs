//! Actual-charge query: arguments, SQL text and typed rows.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dataset::Record;
use crate::error::{Error, Result};

/// Local date-time layouts accepted besides RFC 3339.
const LOCAL_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Estate (project) identifier: a positive number or a string code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EstateId {
    Number(i64),
    Code(String),
}

impl EstateId {
    fn validate(&self) -> Result<()> {
        match self {
            EstateId::Number(n) if *n < 1 => Err(Error::validation(
                "estate_id",
                format!("{n} is not a positive integer"),
            )),
            EstateId::Code(code) if code.is_empty() => Err(Error::validation(
                "estate_id",
                "must be a non-empty string or a positive integer",
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for EstateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EstateId::Number(n) => write!(f, "{n}"),
            EstateId::Code(code) => f.write_str(code),
        }
    }
}

impl From<i64> for EstateId {
    fn from(n: i64) -> Self {
        EstateId::Number(n)
    }
}

impl From<i32> for EstateId {
    fn from(n: i32) -> Self {
        EstateId::Number(n.into())
    }
}

impl From<u32> for EstateId {
    fn from(n: u32) -> Self {
        EstateId::Number(n.into())
    }
}

impl From<&str> for EstateId {
    fn from(code: &str) -> Self {
        EstateId::Code(code.to_string())
    }
}

impl From<String> for EstateId {
    fn from(code: String) -> Self {
        EstateId::Code(code)
    }
}

/// Arguments of an actual-charge lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActualChargeQuery {
    pub estate_id: EstateId,
    /// Charge item name, e.g. the property-fee item.
    pub types: String,
    pub room_no: String,
    /// Lower bound (inclusive) on the charge period end date.
    pub end_date: String,
}

impl ActualChargeQuery {
    pub fn new(
        estate_id: impl Into<EstateId>,
        types: impl Into<String>,
        room_no: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            estate_id: estate_id.into(),
            types: types.into(),
            room_no: room_no.into(),
            end_date: end_date.into(),
        }
    }

    /// Check every argument; the first failure is reported.
    pub fn validate(&self) -> Result<()> {
        self.estate_id.validate()?;
        require_non_empty("types", &self.types)?;
        require_non_empty("room_no", &self.room_no)?;
        require_non_empty("end_date", &self.end_date)?;
        if !is_date_time(&self.end_date) {
            return Err(Error::validation(
                "end_date",
                format!("{:?} is not a date-time", self.end_date),
            ));
        }
        Ok(())
    }

    /// The SQL sent through `GetDataSet`.
    ///
    /// Values are substituted verbatim, without quoting or escaping, as the
    /// billing service has always received them. Never pass untrusted input.
    pub fn to_sql(&self) -> String {
        format!(
            "select
    cml.ChargeMListID,
    cml.ChargeMListNo,
    cml.ChargeTime,
    cml.PayerName,
    cml.ChargePersonName,
    cml.ActualPayMoney,
    cml.EstateID,
    cml.ItemNames,
    ed.Caption as EstateName,
    cfi.ChargeFeeItemID,
    cfi.ActualAmount,
    cfi.SDate,
    cfi.EDate,
    cfi.RmId,
    rd.RmNo,
    cml.CreateTime,
    cml.LastUpdateTime,
    cbi.ItemName,
    cbi.IsPayFull
from
    chargeMasterList cml,EstateDetail ed,ChargeFeeItem cfi,RoomDetail rd,ChargeBillItem cbi
where
    cml.EstateID=ed.EstateID
    and
    cml.ChargeMListID=cfi.ChargeMListID
    and
    cfi.RmId=rd.RmId
    and
    cfi.CBillItemID=cbi.CBillItemID
    and
    (cml.EstateID={estate_id} and cbi.ItemName='{types}' and rd.RmNo='{room_no}' and cfi.EDate>='{end_date}')
order by cfi.ChargeFeeItemID desc;",
            estate_id = self.estate_id,
            types = self.types,
            room_no = self.room_no,
            end_date = self.end_date,
        )
    }
}

fn require_non_empty(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(field, "must be a non-empty string"));
    }
    Ok(())
}

fn is_date_time(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || LOCAL_DATE_TIME_FORMATS
            .iter()
            .any(|format| NaiveDateTime::parse_from_str(value, format).is_ok())
}

/// Typed view of one actual-charge row.
///
/// Every column is optional text; amounts and timestamps are left as the
/// service formats them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActualCharge {
    #[serde(rename = "ChargeMListID")]
    pub charge_m_list_id: Option<String>,
    #[serde(rename = "ChargeMListNo")]
    pub charge_m_list_no: Option<String>,
    pub charge_time: Option<String>,
    pub payer_name: Option<String>,
    pub charge_person_name: Option<String>,
    pub actual_pay_money: Option<String>,
    #[serde(rename = "EstateID")]
    pub estate_id: Option<String>,
    pub item_names: Option<String>,
    pub estate_name: Option<String>,
    #[serde(rename = "ChargeFeeItemID")]
    pub charge_fee_item_id: Option<String>,
    pub actual_amount: Option<String>,
    #[serde(rename = "SDate")]
    pub s_date: Option<String>,
    #[serde(rename = "EDate")]
    pub e_date: Option<String>,
    pub rm_id: Option<String>,
    pub rm_no: Option<String>,
    pub create_time: Option<String>,
    pub last_update_time: Option<String>,
    pub item_name: Option<String>,
    pub is_pay_full: Option<String>,
}

impl From<&Record> for ActualCharge {
    fn from(record: &Record) -> Self {
        let text = |column: &str| record.get_text(column).map(str::to_string);
        Self {
            charge_m_list_id: text("ChargeMListID"),
            charge_m_list_no: text("ChargeMListNo"),
            charge_time: text("ChargeTime"),
            payer_name: text("PayerName"),
            charge_person_name: text("ChargePersonName"),
            actual_pay_money: text("ActualPayMoney"),
            estate_id: text("EstateID"),
            item_names: text("ItemNames"),
            estate_name: text("EstateName"),
            charge_fee_item_id: text("ChargeFeeItemID"),
            actual_amount: text("ActualAmount"),
            s_date: text("SDate"),
            e_date: text("EDate"),
            rm_id: text("RmId"),
            rm_no: text("RmNo"),
            create_time: text("CreateTime"),
            last_update_time: text("LastUpdateTime"),
            item_name: text("ItemName"),
            is_pay_full: text("IsPayFull"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_data_set;

    fn query() -> ActualChargeQuery {
        ActualChargeQuery::new(12, "物业费", "1-1-101", "2024-01-01 00:00:00")
    }

    #[test]
    fn test_valid_query() {
        assert!(query().validate().is_ok());
        assert!(ActualChargeQuery::new("E-12", "Water", "3-202", "2024-06-30T23:59:59+08:00")
            .validate()
            .is_ok());
        assert!(ActualChargeQuery::new(1, "Water", "3-202", "2024-06-30T23:59:59.125")
            .validate()
            .is_ok());
    }

    #[test]
    fn test_estate_id_must_be_positive_or_non_empty() {
        for estate_id in [EstateId::Number(0), EstateId::Number(-3), EstateId::Code(String::new())] {
            let err = ActualChargeQuery { estate_id, ..query() }.validate().unwrap_err();
            assert!(err.is_validation_error());
            assert!(err.to_string().contains("estate_id"));
        }
    }

    #[test]
    fn test_text_fields_must_be_non_empty() {
        let err = ActualChargeQuery { types: String::new(), ..query() }
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("types"));

        let err = ActualChargeQuery { room_no: String::new(), ..query() }
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("room_no"));

        let err = ActualChargeQuery { end_date: String::new(), ..query() }
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("end_date"));
    }

    #[test]
    fn test_end_date_must_be_a_date_time() {
        for end_date in ["not-a-date", "2024-01-01", "2024-13-01 00:00:00", "01/02/2024 10:00:00"] {
            let err = ActualChargeQuery::new(12, "Water", "3-202", end_date)
                .validate()
                .unwrap_err();
            assert!(err.is_validation_error(), "{end_date} should be rejected");
        }
    }

    #[test]
    fn test_sql_interpolates_values_verbatim() {
        let sql = query().to_sql();
        assert!(sql.contains(
            "(cml.EstateID=12 and cbi.ItemName='物业费' and rd.RmNo='1-1-101' and cfi.EDate>='2024-01-01 00:00:00')"
        ));
        assert!(sql.starts_with("select"));
        assert!(sql.ends_with("order by cfi.ChargeFeeItemID desc;"));

        let sql = ActualChargeQuery::new("A'7", "t", "r", "2024-01-01 00:00:00").to_sql();
        assert!(sql.contains("cml.EstateID=A'7 and"));
    }

    #[test]
    fn test_actual_charge_from_record() {
        let records = parse_data_set(
            "<NewDataSet><Table><ChargeMListID>501</ChargeMListID><RmNo>1-1-101</RmNo>\
             <EstateName>Garden</EstateName><IsPayFull>true</IsPayFull><PayerName/></Table></NewDataSet>",
        );
        let charge = ActualCharge::from(&records[0]);

        assert_eq!(charge.charge_m_list_id.as_deref(), Some("501"));
        assert_eq!(charge.rm_no.as_deref(), Some("1-1-101"));
        assert_eq!(charge.estate_name.as_deref(), Some("Garden"));
        assert_eq!(charge.is_pay_full.as_deref(), Some("true"));
        assert_eq!(charge.payer_name, None);
        assert_eq!(charge.actual_amount, None);
    }

    #[test]
    fn test_actual_charge_json_names_match_columns() {
        let charge = ActualCharge {
            charge_m_list_id: Some("1".into()),
            s_date: Some("2024-01-01".into()),
            rm_id: Some("9".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&charge).unwrap();
        assert_eq!(json["ChargeMListID"], "1");
        assert_eq!(json["SDate"], "2024-01-01");
        assert_eq!(json["RmId"], "9");
        assert!(json["PayerName"].is_null());
    }
}
