//! Typed snapshots of the API's resource responses. Fields the client never
//! reads (bank-internal card metadata and the like) stay untyped
//! [`serde_json::Value`] pass-throughs.

use crate::timestamp::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Balance {
    pub available_balance: Decimal,
    pub usable_balance: Decimal,
    pub iban: String,
    pub bic: String,
    pub bank_name: String,
    pub seized: bool,
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersonalInfo {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub kyc_first_name: String,
    pub kyc_last_name: String,
    pub title: String,
    pub gender: String,
    pub birth_date: Timestamp,
    pub signup_completed: bool,
    pub nationality: String,
    pub mobile_phone_number: String,
    pub shadow_user_id: String,
    pub transfer_wise_terms_accepted: bool,
    pub id_now_token: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Statuses {
    pub id: String,
    pub created: Timestamp,
    pub updated: Timestamp,
    pub single_step_signup: Timestamp,
    pub email_validation_initiated: Timestamp,
    pub email_validation_completed: Timestamp,
    pub product_selection_completed: Timestamp,
    pub phone_pairing_initiated: Timestamp,
    pub phone_pairing_completed: Timestamp,
    pub kyc_initiated: Timestamp,
    pub kyc_completed: Timestamp,
    #[serde(rename = "kycWebIDInitiated")]
    pub kyc_web_id_initiated: Timestamp,
    #[serde(rename = "kycWebIDCompleted")]
    pub kyc_web_id_completed: Timestamp,
    pub card_activation_completed: Timestamp,
    pub pin_definition_completed: Timestamp,
    pub bank_account_creation_initiated: Timestamp,
    // The wire spelling really is "Succeded".
    #[serde(rename = "bankAccountCreationSucceded")]
    pub bank_account_creation_succeeded: Timestamp,
    pub flex_account: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Addresses {
    pub paging: Paging,
    pub data: Vec<Address>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Paging {
    pub total_results: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    pub address_line1: String,
    pub street_name: String,
    pub house_number_block: String,
    pub zip_code: String,
    pub city_name: String,
    pub country_name: String,
    #[serde(rename = "type")]
    pub address_type: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub public_token: Value,
    pub pan: Value,
    pub masked_pan: String,
    pub expiration_date: Timestamp,
    pub card_type: String,
    pub status: String,
    pub card_product: Value,
    pub card_product_type: String,
    pub pin_defined: Value,
    pub card_activated: Value,
    pub username_on_card: String,
    pub exceet_express_card_delivery: Value,
    pub membership: Value,
    pub exceet_actual_delivery_date: Value,
    pub exceet_express_card_delivery_email_sent: Value,
    pub exceet_card_status: Value,
    pub exceet_expected_delivery_date: Value,
    pub exceet_express_card_delivery_tracking_id: Value,
    pub card_settings_id: Value,
    pub mpts_card: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limit {
    pub limit: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Contact {
    pub user_id: String,
    pub id: String,
    pub name: String,
    pub subtitle: String,
    pub account: ContactAccount,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactAccount {
    pub account_type: String,
    pub iban: String,
    pub bic: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub amount: Decimal,
    pub currency_code: String,
    pub original_amount: Option<Decimal>,
    pub original_currency: Option<String>,
    pub exchange_rate: Option<Decimal>,
    pub merchant_city: Option<String>,
    #[serde(rename = "visibleTS")]
    pub visible_ts: Timestamp,
    pub mcc: Option<i32>,
    pub mcc_group: Option<i32>,
    pub merchant_name: Option<String>,
    pub recurring: bool,
    pub account_id: String,
    pub category: String,
    pub card_id: Option<String>,
    pub user_certified: Timestamp,
    pub pending: bool,
    pub transaction_nature: String,
    #[serde(rename = "createdTS")]
    pub created_ts: Timestamp,
    pub merchant_country: Option<i32>,
    pub smart_link_id: String,
    pub link_id: String,
    pub confirmed: Timestamp,
    pub partner_bic: Option<String>,
    pub partner_bcn: Option<String>,
    pub partner_account_is_sepa: bool,
    pub partner_name: Option<String>,
    pub partner_iban: Option<String>,
    pub partner_account_ban: Option<String>,
    pub reference_text: Option<String>,
    pub user_accepted: Timestamp,
    pub smart_contact_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Statement {
    pub id: String,
    pub url: String,
    #[serde(rename = "visibleTS")]
    pub visible_ts: Timestamp,
    pub month: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Spaces {
    pub total_balance: Decimal,
    pub visibility: String,
    pub spaces: Vec<Space>,
    pub user_features: UserFeatures,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Space {
    pub id: String,
    pub name: String,
    pub image_url: Option<String>,
    pub is_primary: bool,
    pub is_hidden_from_balance: bool,
    pub is_locked: bool,
    pub is_card_attached: bool,
    pub balance: SpaceBalance,
    pub goal: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpaceBalance {
    pub available_balance: Decimal,
    pub overdraft_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserFeatures {
    pub available_spaces: i64,
    pub can_upgrade: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn parses_balance() {
        let payload = json!({
            "availableBalance": 1234.5,
            "usableBalance": 1200.25,
            "iban": "DE89370400440532013000",
            "bic": "NTSBDEB1XXX",
            "bankName": "N26 Bank",
            "seized": false,
            "id": "acc-1"
        });
        let balance: Balance = serde_json::from_value(payload).expect("balance should parse");
        assert_eq!(
            balance.available_balance,
            Decimal::from_str("1234.5").unwrap()
        );
        assert_eq!(balance.iban, "DE89370400440532013000");
        assert!(!balance.seized);
    }

    #[test]
    fn parses_transactions_with_local_timestamps() {
        let payload = json!([{
            "id": "txn-1",
            "userId": "user-1",
            "type": "PT",
            "amount": -12.5,
            "currencyCode": "EUR",
            "merchantName": "Backerei",
            "visibleTS": 1521308624123i64,
            "createdTS": 1521308624123i64,
            "recurring": false,
            "accountId": "acc-1",
            "category": "micro-v2-food-groceries",
            "pending": false,
            "transactionNature": "NORMAL",
            "smartLinkId": "link-1",
            "linkId": "link-1"
        }]);
        let transactions: Vec<Transaction> =
            serde_json::from_value(payload).expect("transactions should parse");
        assert_eq!(transactions.len(), 1);
        let txn = &transactions[0];
        assert_eq!(txn.amount, Decimal::from_str("-12.5").unwrap());
        assert_eq!(txn.merchant_name.as_deref(), Some("Backerei"));
        // 17:43 written in CET decodes to 16:43 UTC
        assert_eq!(txn.visible_ts.as_millis(), Some(1521308624123));
        assert!(txn.confirmed.is_unset());
        assert_eq!(txn.card_id, None);
    }

    #[test]
    fn parses_cards_with_untyped_fields() {
        let payload = json!([{
            "id": "card-1",
            "publicToken": null,
            "maskedPan": "517337******1234",
            "expirationDate": 1806796800000i64,
            "cardType": "MASTERCARD",
            "status": "M_ACTIVE",
            "cardProduct": {"tier": "STANDARD"},
            "cardProductType": "STANDARD",
            "usernameOnCard": "JANE DOE",
            "mptsCard": true
        }]);
        let cards: Vec<Card> = serde_json::from_value(payload).expect("cards should parse");
        let card = &cards[0];
        assert_eq!(card.masked_pan, "517337******1234");
        assert!(card.public_token.is_null());
        assert_eq!(card.card_product["tier"], "STANDARD");
        assert!(!card.expiration_date.is_unset());
    }

    #[test]
    fn parses_spaces() {
        let payload = json!({
            "totalBalance": 2500.00,
            "visibility": "VISIBLE",
            "spaces": [
                {
                    "id": "space-1",
                    "name": "Main Account",
                    "isPrimary": true,
                    "balance": {"availableBalance": 2000.00}
                },
                {
                    "id": "space-2",
                    "name": "Vacation",
                    "isPrimary": false,
                    "balance": {"availableBalance": 500.00},
                    "goal": {"amount": 1500.00}
                }
            ],
            "userFeatures": {"availableSpaces": 8, "canUpgrade": true}
        });
        let spaces: Spaces = serde_json::from_value(payload).expect("spaces should parse");
        assert_eq!(spaces.spaces.len(), 2);
        assert!(spaces.spaces[0].is_primary);
        assert_eq!(
            spaces.spaces[1].balance.available_balance,
            Decimal::from_str("500").unwrap()
        );
        assert_eq!(spaces.user_features.available_spaces, 8);
    }

    #[test]
    fn statuses_tolerate_missing_milestones() {
        let payload = json!({
            "id": "user-1",
            "created": 1521308624123i64,
            "kycCompleted": null,
            "flexAccount": false
        });
        let statuses: Statuses = serde_json::from_value(payload).expect("statuses should parse");
        assert!(!statuses.created.is_unset());
        assert!(statuses.kyc_completed.is_unset());
        assert!(statuses.phone_pairing_initiated.is_unset());
    }
}
