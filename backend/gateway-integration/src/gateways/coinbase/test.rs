#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::expect_used)]
#[allow(clippy::panic)]
mod tests {
    use std::{collections::HashMap, marker::PhantomData};

    use common_enums::{Currency, PaymentMethod, TransactionStatus};
    use common_utils::{
        crypto::SignMessage, request::RequestContent, types::MinorUnit, Method, Secret,
    };
    use domain_types::{
        flow::{Authorize, CreateRedirect, PSync},
        gateway_data::{ErrorResponse, GatewayAuthType, GatewayData},
        gateway_types::{
            GatewayWebhookSecrets, PayerInfo, PaymentFlowData, PaymentsAuthorizeData,
            PaymentsResponseData, PaymentsSyncData, RedirectCheckoutData, RedirectForm,
            RequestDetails, ResponseId,
        },
        invoice::InvoiceRef,
        payment_method_data::PaymentMethodData,
        types::{GatewayParams, Gateways},
    };
    use interfaces::{
        api::Response, gateway_integration::GatewayIntegration, webhooks::IncomingWebhook,
    };

    use crate::gateways::Coinbase;

    fn gateways() -> Gateways {
        Gateways {
            coinbase: GatewayParams {
                base_url: "https://api.commerce.coinbase.com/".to_string(),
                secondary_base_url: None,
            },
            ..Default::default()
        }
    }

    fn auth() -> GatewayAuthType {
        GatewayAuthType::HeaderKey {
            api_key: Secret::new("cc_api_key_1".to_string()),
        }
    }

    fn payment_flow_data() -> PaymentFlowData {
        PaymentFlowData {
            status: TransactionStatus::Pending,
            payment_id: "pay_cb_1".to_string(),
            gateway_request_reference_id: "ref_cb_1".to_string(),
            payment_method: PaymentMethod::Crypto,
            description: Some("Order #1001".to_string()),
            return_url: None,
            webhook_url: None,
            payer: PayerInfo::default(),
            gateway_meta: None,
            test_mode: Some(true),
            gateways: gateways(),
            raw_gateway_response: None,
        }
    }

    fn invoices() -> Vec<InvoiceRef> {
        vec![
            InvoiceRef::new("42", MinorUnit::new(6000)),
            InvoiceRef::new("43", MinorUnit::new(4000)),
        ]
    }

    fn redirect_data(
    ) -> GatewayData<CreateRedirect, PaymentFlowData, RedirectCheckoutData, PaymentsResponseData>
    {
        GatewayData {
            flow: PhantomData,
            resource_common_data: payment_flow_data(),
            auth_type: auth(),
            request: RedirectCheckoutData {
                amount: MinorUnit::new(10000),
                currency: Currency::USD,
                client_id: "client-7".to_string(),
                invoice_refs: invoices(),
                description: Some("Invoices 42 and 43".to_string()),
                return_url: "https://host.example/return".to_string(),
                cancel_url: Some("https://host.example/cancel".to_string()),
                webhook_url: None,
            },
            response: Err(ErrorResponse::get_not_implemented()),
        }
    }

    pub mod create_redirect {
        use domain_types::invoice::InvoiceEnvelope;

        use super::*;

        #[test]
        fn charge_request_carries_the_invoice_envelope() {
            let gateway = Coinbase::new();
            let data = redirect_data();

            let url = gateway.get_url(&data).unwrap();
            assert_eq!(url, "https://api.commerce.coinbase.com/charges");

            let body = match gateway.get_request_body(&data).unwrap().unwrap() {
                RequestContent::Json(value) => value,
                other => panic!("expected json body, got {other:?}"),
            };
            assert_eq!(body["pricing_type"], "fixed_price");
            assert_eq!(body["local_price"]["amount"], "100.00");
            assert_eq!(body["local_price"]["currency"], "USD");
            assert_eq!(body["metadata"]["client_id"], "client-7");

            let packed = body["metadata"]["invoice_envelope"].as_str().unwrap();
            let recovered = InvoiceEnvelope::decode(packed).unwrap();
            assert_eq!(recovered.client_id.as_deref(), Some("client-7"));
            assert_eq!(recovered.invoices, invoices());
        }

        #[test]
        fn auth_headers_carry_the_masked_api_key() {
            let gateway = Coinbase::new();
            let data = redirect_data();
            let headers = gateway.get_headers(&data).unwrap();
            let api_key = headers
                .iter()
                .find(|(name, _)| name == "X-CC-Api-Key")
                .map(|(_, value)| value)
                .unwrap();
            assert!(api_key.is_masked());
        }

        #[test]
        fn created_charge_lands_pending_with_hosted_url() {
            let gateway = Coinbase::new();
            let res = Response {
                response: bytes::Bytes::from_static(
                    br#"{"data":{"id":"uuid-9","code":"CHARGE1","hosted_url":"https://commerce.coinbase.com/charges/CHARGE1"}}"#,
                ),
                status_code: 201,
            };
            let handled = gateway.handle_response(redirect_data(), None, res).unwrap();
            assert_eq!(handled.resource_common_data.status, TransactionStatus::Pending);
            let PaymentsResponseData::TransactionResponse {
                resource_id,
                redirection_data,
                ..
            } = handled.response.unwrap();
            assert!(matches!(
                resource_id,
                ResponseId::GatewayTransactionId(code) if code == "CHARGE1"
            ));
            match redirection_data.unwrap().as_ref() {
                RedirectForm::Uri { uri } => {
                    assert_eq!(uri, "https://commerce.coinbase.com/charges/CHARGE1");
                }
                other => panic!("expected uri redirect, got {other:?}"),
            }
        }
    }

    pub mod psync {
        use super::*;

        #[test]
        fn sync_queries_the_charge_by_code() {
            let gateway = Coinbase::new();
            let data: GatewayData<PSync, PaymentFlowData, PaymentsSyncData, PaymentsResponseData> =
                GatewayData {
                    flow: PhantomData,
                    resource_common_data: payment_flow_data(),
                    auth_type: auth(),
                    request: PaymentsSyncData {
                        gateway_transaction_id: ResponseId::GatewayTransactionId(
                            "CHARGE1".to_string(),
                        ),
                        amount: MinorUnit::new(10000),
                        currency: Currency::USD,
                    },
                    response: Err(ErrorResponse::get_not_implemented()),
                };
            assert_eq!(
                gateway.get_url(&data).unwrap(),
                "https://api.commerce.coinbase.com/charges/CHARGE1"
            );
            assert_eq!(
                GatewayIntegration::<PSync, _, _, _>::get_http_method(gateway),
                Method::Get
            );

            let res = Response {
                response: bytes::Bytes::from_static(
                    br#"{"data":{"id":"uuid-9","code":"CHARGE1","timeline":[{"status":"NEW","time":null},{"status":"COMPLETED","time":null}]}}"#,
                ),
                status_code: 200,
            };
            let handled = gateway.handle_response(data, None, res).unwrap();
            assert_eq!(handled.resource_common_data.status, TransactionStatus::Approved);
        }
    }

    pub mod webhook {
        use super::*;

        fn webhook_body() -> String {
            let envelope = domain_types::invoice::InvoiceEnvelope::new(
                Some("client-7".to_string()),
                invoices(),
            )
            .encode()
            .unwrap();
            serde_json::json!({
                "event": {
                    "id": "evt_1",
                    "type": "charge:confirmed",
                    "data": {
                        "id": "uuid-9",
                        "code": "CHARGE1",
                        "timeline": [
                            {"status": "NEW", "time": null},
                            {"status": "COMPLETED", "time": null}
                        ],
                        "metadata": {
                            "invoice_envelope": envelope,
                            "client_id": "client-7"
                        },
                        "pricing": {
                            "local": {"amount": "100.00", "currency": "USD"}
                        }
                    }
                }
            })
            .to_string()
        }

        fn signed_request(body: String, secret: &[u8]) -> RequestDetails {
            let signature = common_utils::crypto::HmacSha256
                .sign_message(secret, body.as_bytes())
                .unwrap();
            RequestDetails {
                method: Method::Post,
                uri: Some("/webhooks/coinbase".to_string()),
                headers: HashMap::from([(
                    "X-CC-Webhook-Signature".to_string(),
                    hex::encode(signature),
                )]),
                body: body.into_bytes(),
                query_params: None,
            }
        }

        fn secrets() -> GatewayWebhookSecrets {
            GatewayWebhookSecrets {
                secret: b"whsec_cb".to_vec(),
                additional_secret: None,
            }
        }

        #[test]
        fn verified_notification_recovers_the_invoice_allocation() {
            let gateway = Coinbase::new();
            let request = signed_request(webhook_body(), b"whsec_cb");
            let details = gateway
                .handle_webhook("coinbase", request, Some(secrets()))
                .unwrap();
            assert_eq!(details.status, TransactionStatus::Approved);
            assert_eq!(details.event_id.as_deref(), Some("evt_1"));
            assert_eq!(details.amount, Some(MinorUnit::new(10000)));
            assert_eq!(details.currency, Some(Currency::USD));
            let envelope = details.invoice_envelope.unwrap();
            assert_eq!(envelope.invoices, invoices());
            assert_eq!(envelope.client_id.as_deref(), Some("client-7"));
        }

        #[test]
        fn tampered_payload_is_rejected_before_parsing() {
            let gateway = Coinbase::new();
            let mut request = signed_request(webhook_body(), b"whsec_cb");
            request.body = webhook_body().replace("100.00", "999.00").into_bytes();
            let result = gateway.handle_webhook("coinbase", request, Some(secrets()));
            assert!(result.is_err());
        }

        #[test]
        fn wrong_secret_is_rejected() {
            let gateway = Coinbase::new();
            let request = signed_request(webhook_body(), b"someone_elses_secret");
            assert!(gateway
                .handle_webhook("coinbase", request, Some(secrets()))
                .is_err());
        }

        #[test]
        fn missing_signature_header_is_rejected() {
            let gateway = Coinbase::new();
            let mut request = signed_request(webhook_body(), b"whsec_cb");
            request.headers.clear();
            assert!(gateway
                .handle_webhook("coinbase", request, Some(secrets()))
                .is_err());
        }
    }

    pub mod unsupported_flows {
        use domain_types::payment_method_data::{Card, CardNumber};
        use std::str::FromStr;

        use super::*;

        #[test]
        fn direct_card_charge_surfaces_not_implemented() {
            let gateway = Coinbase::new();
            let data: GatewayData<
                Authorize,
                PaymentFlowData,
                PaymentsAuthorizeData,
                PaymentsResponseData,
            > = GatewayData {
                flow: PhantomData,
                resource_common_data: payment_flow_data(),
                auth_type: auth(),
                request: PaymentsAuthorizeData {
                    payment_method_data: PaymentMethodData::Card(Card {
                        card_number: CardNumber::from_str("4111111111111111").unwrap(),
                        card_exp_month: Secret::new("10".to_string()),
                        card_exp_year: Secret::new("2027".to_string()),
                        card_cvc: Secret::new("123".to_string()),
                        card_holder_name: None,
                    }),
                    amount: MinorUnit::new(10000),
                    currency: Currency::USD,
                    auto_capture: true,
                    invoice_refs: invoices(),
                    email: None,
                    metadata: None,
                },
                response: Err(ErrorResponse::get_not_implemented()),
            };
            assert!(gateway.build_request(&data).is_err());
        }
    }
}
