#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
#[allow(clippy::panic)]
mod tests {
    use std::{marker::PhantomData, str::FromStr};

    use common_enums::{Currency, PaymentMethod, RefundStatus, TransactionStatus};
    use common_utils::{request::RequestContent, types::MinorUnit, Secret};
    use domain_types::{
        flow::{Authorize, PSync, Refund, Void},
        gateway_data::{ErrorResponse, GatewayAuthType, GatewayData},
        gateway_types::{
            PayerInfo, PaymentFlowData, PaymentVoidData, PaymentsAuthorizeData,
            PaymentsResponseData, PaymentsSyncData, RefundFlowData, RefundsData,
            RefundsResponseData, ResponseId,
        },
        invoice::InvoiceRef,
        payment_method_data::{Card, CardNumber, PaymentMethodData},
        types::{GatewayParams, Gateways},
    };
    use interfaces::{api::Response, gateway_integration::GatewayIntegration};

    use crate::gateways::Converge;

    fn gateways() -> Gateways {
        Gateways {
            converge: GatewayParams {
                base_url: "https://api.demo.convergepay.com/VirtualMerchantDemo/".to_string(),
                secondary_base_url: None,
            },
            ..Default::default()
        }
    }

    fn auth() -> GatewayAuthType {
        GatewayAuthType::SignatureKey {
            api_key: Secret::new("merchant_0099".to_string()),
            key1: Secret::new("webuser".to_string()),
            api_secret: Secret::new("PIN1234".to_string()),
        }
    }

    fn payment_flow_data() -> PaymentFlowData {
        PaymentFlowData {
            status: TransactionStatus::Pending,
            payment_id: "pay_123".to_string(),
            gateway_request_reference_id: "ref_123".to_string(),
            payment_method: PaymentMethod::Card,
            description: None,
            return_url: None,
            webhook_url: None,
            payer: PayerInfo::default(),
            gateway_meta: None,
            test_mode: Some(true),
            gateways: gateways(),
            raw_gateway_response: None,
        }
    }

    fn card() -> Card {
        Card {
            card_number: CardNumber::from_str("4111111111111111").unwrap(),
            card_exp_month: Secret::new("10".to_string()),
            card_exp_year: Secret::new("2027".to_string()),
            card_cvc: Secret::new("123".to_string()),
            card_holder_name: Some(Secret::new("Ann".to_string())),
        }
    }

    fn authorize_data(
        auto_capture: bool,
    ) -> GatewayData<Authorize, PaymentFlowData, PaymentsAuthorizeData, PaymentsResponseData> {
        GatewayData {
            flow: PhantomData,
            resource_common_data: payment_flow_data(),
            auth_type: auth(),
            request: PaymentsAuthorizeData {
                payment_method_data: PaymentMethodData::Card(card()),
                amount: MinorUnit::new(10000),
                currency: Currency::USD,
                auto_capture,
                invoice_refs: vec![
                    InvoiceRef::new("42", MinorUnit::new(6000)),
                    InvoiceRef::new("43", MinorUnit::new(4000)),
                ],
                email: None,
                metadata: None,
            },
            response: Err(ErrorResponse::get_not_implemented()),
        }
    }

    fn form_fields(content: RequestContent) -> Vec<(String, String)> {
        match content {
            RequestContent::FormUrlEncoded(fields) => fields,
            other => panic!("expected form body, got {other:?}"),
        }
    }

    fn field<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
        fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub mod authorize {
        use super::*;

        #[test]
        fn charge_builds_a_ccsale_form_request() {
            let gateway = Converge::new();
            let data = authorize_data(true);

            let url = gateway.get_url(&data).unwrap();
            assert_eq!(
                url,
                "https://api.demo.convergepay.com/VirtualMerchantDemo/process.do"
            );

            let body = gateway.get_request_body(&data).unwrap().unwrap();
            let fields = form_fields(body);
            assert_eq!(field(&fields, "ssl_transaction_type"), Some("ccsale"));
            assert_eq!(field(&fields, "ssl_merchant_id"), Some("merchant_0099"));
            assert_eq!(field(&fields, "ssl_amount"), Some("100.00"));
            assert_eq!(field(&fields, "ssl_card_number"), Some("4111111111111111"));
            assert_eq!(field(&fields, "ssl_exp_date"), Some("1027"));
            assert_eq!(field(&fields, "ssl_invoice_number"), Some("42"));
            assert_eq!(field(&fields, "ssl_description"), Some("42=6000|43=4000"));
        }

        #[test]
        fn reservation_builds_ccauthonly_and_lands_pending() {
            let gateway = Converge::new();
            let data = authorize_data(false);

            let fields = form_fields(gateway.get_request_body(&data).unwrap().unwrap());
            assert_eq!(field(&fields, "ssl_transaction_type"), Some("ccauthonly"));

            let res = Response {
                response: bytes::Bytes::from_static(
                    br#"{"ssl_result":"0","ssl_txn_id":"txn_77","ssl_approval_code":"OK321"}"#,
                ),
                status_code: 200,
            };
            let handled = gateway.handle_response(data, None, res).unwrap();
            assert_eq!(handled.resource_common_data.status, TransactionStatus::Pending);
        }

        #[test]
        fn approved_sale_lands_approved_with_txn_id() {
            let gateway = Converge::new();
            let res = Response {
                response: bytes::Bytes::from_static(
                    br#"{"ssl_result":"0","ssl_txn_id":"txn_88","ssl_approval_code":"OK999"}"#,
                ),
                status_code: 200,
            };
            let handled = gateway.handle_response(authorize_data(true), None, res).unwrap();
            assert_eq!(handled.resource_common_data.status, TransactionStatus::Approved);
            let response = handled.response.unwrap();
            let PaymentsResponseData::TransactionResponse {
                resource_id,
                reference_id,
                ..
            } = response;
            assert!(matches!(
                resource_id,
                ResponseId::GatewayTransactionId(id) if id == "txn_88"
            ));
            assert_eq!(reference_id.as_deref(), Some("OK999"));
        }

        #[test]
        fn declined_sale_lands_declined_with_message() {
            let gateway = Converge::new();
            let res = Response {
                response: bytes::Bytes::from_static(
                    br#"{"ssl_result":"1","ssl_result_message":"DECLINED","ssl_txn_id":"txn_d"}"#,
                ),
                status_code: 200,
            };
            let handled = gateway.handle_response(authorize_data(true), None, res).unwrap();
            assert_eq!(handled.resource_common_data.status, TransactionStatus::Declined);
            let error = handled.response.unwrap_err();
            assert_eq!(error.message, "DECLINED");
            assert_eq!(error.gateway_transaction_id.as_deref(), Some("txn_d"));
        }

        #[test]
        fn credential_error_lands_error_not_declined() {
            let gateway = Converge::new();
            let res = Response {
                response: bytes::Bytes::from_static(
                    br#"{"errorCode":4025,"errorName":"Invalid Credentials","errorMessage":"The credentials supplied in the authorization request are invalid"}"#,
                ),
                status_code: 200,
            };
            let handled = gateway.handle_response(authorize_data(true), None, res).unwrap();
            assert_eq!(handled.resource_common_data.status, TransactionStatus::Error);
            let error = handled.response.unwrap_err();
            assert_eq!(error.code, "4025");
            assert_eq!(error.reason.as_deref(), Some("Invalid Credentials"));
        }
    }

    pub mod void {
        use super::*;

        #[test]
        fn successful_void_reports_void_not_approved() {
            let gateway = Converge::new();
            let data: GatewayData<Void, PaymentFlowData, PaymentVoidData, PaymentsResponseData> =
                GatewayData {
                    flow: PhantomData,
                    resource_common_data: payment_flow_data(),
                    auth_type: auth(),
                    request: PaymentVoidData {
                        gateway_transaction_id: "txn_88".to_string(),
                        reference_id: None,
                    },
                    response: Err(ErrorResponse::get_not_implemented()),
                };

            let fields = form_fields(gateway.get_request_body(&data).unwrap().unwrap());
            assert_eq!(field(&fields, "ssl_transaction_type"), Some("ccvoid"));
            assert_eq!(field(&fields, "ssl_txn_id"), Some("txn_88"));

            let res = Response {
                response: bytes::Bytes::from_static(
                    br#"{"ssl_result":"0","ssl_txn_id":"txn_88"}"#,
                ),
                status_code: 200,
            };
            let handled = gateway.handle_response(data, None, res).unwrap();
            assert_eq!(handled.resource_common_data.status, TransactionStatus::Void);
        }
    }

    pub mod refund {
        use super::*;

        #[test]
        fn successful_return_reports_refunded() {
            let gateway = Converge::new();
            let data: GatewayData<Refund, RefundFlowData, RefundsData, RefundsResponseData> =
                GatewayData {
                    flow: PhantomData,
                    resource_common_data: RefundFlowData {
                        status: RefundStatus::Pending,
                        refund_id: None,
                        gateways: gateways(),
                        raw_gateway_response: None,
                    },
                    auth_type: auth(),
                    request: RefundsData {
                        gateway_transaction_id: "txn_88".to_string(),
                        refund_id: "ref_9".to_string(),
                        minor_refund_amount: MinorUnit::new(2500),
                        currency: Currency::USD,
                        reason: None,
                    },
                    response: Err(ErrorResponse::get_not_implemented()),
                };

            let fields = form_fields(gateway.get_request_body(&data).unwrap().unwrap());
            assert_eq!(field(&fields, "ssl_transaction_type"), Some("ccreturn"));
            assert_eq!(field(&fields, "ssl_amount"), Some("25.00"));

            let res = Response {
                response: bytes::Bytes::from_static(
                    br#"{"ssl_result":"0","ssl_txn_id":"txn_ret_1"}"#,
                ),
                status_code: 200,
            };
            let handled = gateway.handle_response(data, None, res).unwrap();
            assert_eq!(handled.resource_common_data.status, RefundStatus::Success);
            let refund = handled.response.unwrap();
            assert_eq!(refund.gateway_refund_id, "txn_ret_1");
            assert_eq!(refund.refund_status, RefundStatus::Success);
        }
    }

    pub mod unsupported_flows {
        use super::*;

        #[test]
        fn psync_surfaces_not_implemented() {
            let gateway = Converge::new();
            let data: GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData> =
                GatewayData {
                    flow: PhantomData,
                    resource_common_data: payment_flow_data(),
                    auth_type: auth(),
                    request: PaymentsSyncData::default(),
                    response: Err(ErrorResponse::get_not_implemented()),
                };
            let built = gateway.build_request(&data);
            assert!(built.is_err());
        }
    }

    pub mod settings {
        use std::collections::HashMap;

        use interfaces::api::GatewayCommon;

        use super::*;

        #[test]
        fn secret_settings_are_declared_encryptable() {
            let gateway = Converge::new();
            assert!(gateway.encryptable_fields().contains(&"pin"));
        }

        #[test]
        fn missing_credentials_come_back_as_field_errors() {
            let gateway = Converge::new();
            let mut settings = HashMap::new();
            settings.insert("merchant_id".to_string(), Secret::new("m_1".to_string()));
            settings.insert("user_id".to_string(), Secret::new(String::new()));
            let errors = gateway.validate_settings(&settings);
            assert!(errors.get("merchant_id").is_none());
            assert!(errors.get("user_id").is_some());
            assert!(errors.get("pin").is_some());
        }
    }
}
