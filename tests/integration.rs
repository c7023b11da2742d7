//! End-to-end tests of the public API against a mock billing service.
//!
//! Run with:
//!   cargo test --test integration

use std::time::Duration;

use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zkhb_api::{ActualChargeQuery, RequestMethod, RequestOptions, ZkhbClient};

const SERVICE_PATH: &str = "/estate/webService/ForcelandEstateService.asmx";

/// A response shaped like the one the .asmx service sends: inline schema,
/// then the rows inside a diffgram.
fn get_data_set_response(rows: usize) -> String {
    let tables: String = (0..rows)
        .map(|i| {
            format!(
                r#"<Table diffgr:id="Table{n}" msdata:rowOrder="{i}">
                  <ChargeMListID>{id}</ChargeMListID>
                  <ChargeMListNo>SF2024{id:04}</ChargeMListNo>
                  <ChargeTime>2024-03-0{n}T10:15:00+08:00</ChargeTime>
                  <PayerName>Zhang San</PayerName>
                  <ChargePersonName>Cashier</ChargePersonName>
                  <ActualPayMoney>360.00</ActualPayMoney>
                  <EstateID>12</EstateID>
                  <ItemNames>Property fee</ItemNames>
                  <EstateName>Garden Court</EstateName>
                  <ChargeFeeItemID>{fee}</ChargeFeeItemID>
                  <ActualAmount>120.00</ActualAmount>
                  <SDate>2024-01-01T00:00:00+08:00</SDate>
                  <EDate>2024-03-31T00:00:00+08:00</EDate>
                  <RmId>88</RmId>
                  <RmNo>1-1-101</RmNo>
                  <CreateTime>2024-03-0{n}T10:15:00+08:00</CreateTime>
                  <LastUpdateTime>2024-03-0{n}T10:15:00+08:00</LastUpdateTime>
                  <ItemName>Property fee</ItemName>
                  <IsPayFull>true</IsPayFull>
                </Table>"#,
                n = i + 1,
                id = 900 - i,
                fee = 4000 - i,
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <soap:Body>
    <GetDataSetResponse xmlns="http://zkhb.com.cn/">
      <GetDataSetResult>
        <xs:schema id="NewDataSet" xmlns="" xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:msdata="urn:schemas-microsoft-com:xml-msdata">
          <xs:element name="NewDataSet" msdata:IsDataSet="true" msdata:UseCurrentLocale="true">
            <xs:complexType>
              <xs:choice minOccurs="0" maxOccurs="unbounded">
                <xs:element name="Table" />
              </xs:choice>
            </xs:complexType>
          </xs:element>
        </xs:schema>
        <diffgr:diffgram xmlns:msdata="urn:schemas-microsoft-com:xml-msdata" xmlns:diffgr="urn:schemas-microsoft-com:xml-diffgram-v1">
          <NewDataSet xmlns="">{tables}</NewDataSet>
        </diffgr:diffgram>
      </GetDataSetResult>
    </GetDataSetResponse>
  </soap:Body>
</soap:Envelope>"#
    )
}

const CHARGE_COLUMNS: [&str; 19] = [
    "ChargeMListID",
    "ChargeMListNo",
    "ChargeTime",
    "PayerName",
    "ChargePersonName",
    "ActualPayMoney",
    "EstateID",
    "ItemNames",
    "EstateName",
    "ChargeFeeItemID",
    "ActualAmount",
    "SDate",
    "EDate",
    "RmId",
    "RmNo",
    "CreateTime",
    "LastUpdateTime",
    "ItemName",
    "IsPayFull",
];

async fn mount_rows(server: &MockServer, rows: usize) {
    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .and(query_param("op", "GetDataSet"))
        .respond_with(ResponseTemplate::new(200).set_body_string(get_data_set_response(rows)))
        .mount(server)
        .await;
}

fn query() -> ActualChargeQuery {
    ActualChargeQuery::new(12, "Property fee", "1-1-101", "2024-01-01T00:00:00+08:00")
}

#[tokio::test]
async fn test_actual_charge_list_has_all_columns() {
    let server = MockServer::start().await;
    mount_rows(&server, 3).await;

    let client = ZkhbClient::new(format!("{}/", server.uri())).unwrap();
    let records = client
        .query_actual_charge_list(&query(), RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    for record in &records {
        for column in CHARGE_COLUMNS {
            assert!(record.get_text(column).is_some(), "missing column {column}");
        }
        assert_eq!(record.get_text("@diffgr:id").map(|s| s.starts_with("Table")), Some(true));
    }
    assert_eq!(records[0].get_text("ChargeFeeItemID"), Some("4000"));
    assert_eq!(records[2].get_text("ChargeFeeItemID"), Some("3998"));
}

#[tokio::test]
async fn test_single_row_and_typed_view() {
    let server = MockServer::start().await;
    mount_rows(&server, 1).await;

    let client = ZkhbClient::new(server.uri()).unwrap();
    let charges = client
        .query_actual_charges(&query(), RequestOptions::new())
        .await
        .unwrap();

    assert_eq!(charges.len(), 1);
    let charge = &charges[0];
    assert_eq!(charge.charge_m_list_no.as_deref(), Some("SF20240900"));
    assert_eq!(charge.estate_name.as_deref(), Some("Garden Court"));
    assert_eq!(charge.rm_id.as_deref(), Some("88"));
    assert_eq!(charge.is_pay_full.as_deref(), Some("true"));
}

#[tokio::test]
async fn test_no_rows_is_empty() {
    let server = MockServer::start().await;
    mount_rows(&server, 0).await;

    let client = ZkhbClient::new(server.uri()).unwrap();
    let records = client
        .query_actual_charge_list(&query(), RequestOptions::new())
        .await
        .unwrap();

    assert!(records.is_empty());
}

#[tokio::test]
async fn test_records_serialize_to_json_in_column_order() {
    let server = MockServer::start().await;
    mount_rows(&server, 1).await;

    let client = ZkhbClient::new(server.uri()).unwrap();
    let records = client
        .query_actual_charge_list(&query(), RequestOptions::new())
        .await
        .unwrap();

    let json = serde_json::to_string(&records[0]).unwrap();
    let first = json.find("\"ChargeMListID\"").unwrap();
    let last = json.find("\"IsPayFull\"").unwrap();
    assert!(first < last);
}

#[tokio::test]
async fn test_raw_get_data_set_and_plain_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SERVICE_PATH))
        .and(body_string_contains("<sql>select count(*) from RoomDetail</sql>"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<NewDataSet/>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/estate/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = ZkhbClient::new(server.uri()).unwrap();

    let text = client
        .get_data_set("select count(*) from RoomDetail", RequestOptions::new())
        .await
        .unwrap();
    assert_eq!(text.as_deref(), Some("<NewDataSet/>"));

    let http = client.http();
    let health = http
        .execute(http.request(RequestMethod::Get, "estate/health"))
        .await
        .unwrap();
    assert!(health.is_none());

    let status = http
        .execute_with(
            http.request(RequestMethod::Get, "/estate/health")
                .timeout(Duration::from_secs(5)),
            |raw| raw.status(),
        )
        .await
        .unwrap();
    assert_eq!(status, 503);
}

#[tokio::test]
async fn test_validation_happens_before_any_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = ZkhbClient::new(server.uri()).unwrap();

    for bad in [
        ActualChargeQuery::new(0, "Property fee", "1-1-101", "2024-01-01 00:00:00"),
        ActualChargeQuery::new("", "Property fee", "1-1-101", "2024-01-01 00:00:00"),
        ActualChargeQuery::new(12, "", "1-1-101", "2024-01-01 00:00:00"),
        ActualChargeQuery::new(12, "Property fee", "", "2024-01-01 00:00:00"),
        ActualChargeQuery::new(12, "Property fee", "1-1-101", "not-a-date"),
    ] {
        let err = client
            .query_actual_charge_list(&bad, RequestOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_validation_error(), "{bad:?} should be rejected");
    }
}
