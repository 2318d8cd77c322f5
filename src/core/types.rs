use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::profile::SG_STANDARD_GST_RATE;

/// The canonical invoice produced by [`normalize`](super::normalize) or
/// [`InvoiceBuilder`](super::InvoiceBuilder).
///
/// Text fields use the empty string for "absent"; numeric fields the caller
/// may omit are `Option` so the validator can tell absence from zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// BT-1: Invoice number.
    pub invoice_number: String,
    /// BT-3: Invoice type code (UNTDID 1001), kept verbatim.
    pub type_code: String,
    /// BT-2: Issue date.
    pub issue_date: Option<NaiveDate>,
    /// BT-9: Payment due date.
    pub due_date: Option<NaiveDate>,
    /// BT-7: Tax point date.
    pub tax_point_date: Option<NaiveDate>,
    /// BT-5: Document currency code (ISO 4217).
    pub currency_code: String,
    /// BT-10: Buyer reference.
    pub buyer_reference: Option<String>,
    /// BT-22: Free-text notes.
    pub notes: Vec<String>,
    /// BT-12: Contract reference.
    pub contract_reference: Option<String>,
    /// BT-25: Preceding invoice reference (required for credit notes).
    pub preceding_invoice_ref: Option<String>,
    /// BG-4: Seller.
    pub seller: Party,
    /// BG-7: Buyer.
    pub buyer: Party,
    /// BG-25: Invoice lines.
    pub items: Vec<LineItem>,
    /// BG-23: Declared tax breakdown. Empty means "derive from lines".
    pub tax_subtotals: Vec<TaxSubtotal>,
    /// BG-22: Declared document totals.
    pub totals: MonetaryTotals,
    /// BG-16: Payment instructions.
    pub payment: Option<PaymentDetails>,
}

impl Invoice {
    /// Parsed document type, `None` when the code is absent or unrecognized.
    pub fn document_type(&self) -> Option<InvoiceTypeCode> {
        InvoiceTypeCode::from_code(self.type_code.trim())
    }

    /// True when the type code denotes a credit note (381).
    pub fn is_credit_note(&self) -> bool {
        self.document_type() == Some(InvoiceTypeCode::CreditNote)
    }
}

/// BG-4 / BG-7: Seller or buyer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// BT-27 / BT-44: Legal registration name.
    pub name: String,
    /// BT-28 / BT-45: Trading name.
    pub trading_name: Option<String>,
    /// BT-30 / BT-47: Unique Entity Number.
    pub uen: Option<String>,
    /// BT-34 / BT-49: Peppol participant identifier, `<scheme>:<id>`.
    pub peppol_id: Option<String>,
    /// Whether the party is GST-registered.
    pub gst_registered: bool,
    /// BT-31: GST registration number.
    pub gst_number: Option<String>,
    /// BG-5 / BG-8: Postal address.
    pub address: Address,
    /// BG-6 / BG-9: Contact.
    pub contact: Option<Contact>,
}

/// BG-5 / BG-8: Postal address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    /// BT-35 / BT-50.
    pub street: Option<String>,
    /// BT-36 / BT-51.
    pub additional: Option<String>,
    /// BT-37 / BT-52. The serializer falls back to the profile's default city.
    pub city: Option<String>,
    /// BT-38 / BT-53.
    pub postal_code: Option<String>,
    /// BT-40 / BT-55: ISO 3166-1 alpha-2.
    pub country_code: String,
}

/// BG-6 / BG-9: Contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Contact {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }
}

/// BG-25: Invoice line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// BT-126: Line identifier.
    pub id: String,
    /// BT-153: Item name.
    pub name: Option<String>,
    /// BT-154: Item description.
    pub description: Option<String>,
    /// BT-129: Quantity (up to 4 fractional digits).
    pub quantity: Option<Decimal>,
    /// BT-130: Unit of measure (UN/ECE Rec 20).
    pub unit_code: String,
    /// BT-146: Net unit price.
    pub unit_price: Option<Decimal>,
    /// BT-131: Declared line net amount.
    pub line_amount: Option<Decimal>,
    /// Flat line discount, subtracted from quantity × price.
    pub discount: Option<Decimal>,
    /// BT-151: Tax category. `None` when the caller supplied an unknown symbol.
    pub tax_category: Option<TaxCategory>,
    /// BT-152: Tax rate in percent.
    pub tax_rate: Option<Decimal>,
    /// Declared line tax amount.
    pub tax_amount: Option<Decimal>,
    /// BG-27 / BG-28: Line allowances and charges.
    pub allowances: Vec<AllowanceCharge>,
    /// BT-155.
    pub seller_item_id: Option<String>,
    /// BT-156.
    pub buyer_item_id: Option<String>,
    /// BT-157 (GTIN).
    pub standard_item_id: Option<String>,
}

impl LineItem {
    /// Item name, falling back to the description.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.description.as_deref().filter(|d| !d.trim().is_empty()))
    }
}

/// Line-level allowance (discount) or charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceCharge {
    /// True = charge, false = allowance.
    pub is_charge: bool,
    pub amount: Decimal,
    pub reason: Option<String>,
}

/// Singapore GST category symbols and their UBL (UNTDID 5305) mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxCategory {
    /// SR: standard-rated supply.
    StandardRated,
    /// ZR: zero-rated supply (exports, international services).
    ZeroRated,
    /// ES: exempt supply.
    Exempt,
    /// OS: out-of-scope supply.
    OutOfScope,
    /// NG: supplier not GST-registered.
    NotRegistered,
}

impl TaxCategory {
    pub const ALL: [TaxCategory; 5] = [
        Self::StandardRated,
        Self::ZeroRated,
        Self::Exempt,
        Self::OutOfScope,
        Self::NotRegistered,
    ];

    /// Jurisdiction symbol used by callers.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::StandardRated => "SR",
            Self::ZeroRated => "ZR",
            Self::Exempt => "ES",
            Self::OutOfScope => "OS",
            Self::NotRegistered => "NG",
        }
    }

    /// UNTDID 5305 letter emitted in UBL.
    pub fn ubl_code(&self) -> &'static str {
        match self {
            Self::StandardRated => "S",
            Self::ZeroRated => "Z",
            Self::Exempt => "E",
            Self::OutOfScope | Self::NotRegistered => "O",
        }
    }

    /// Canonical rate for the category given the statutory standard rate.
    pub fn canonical_rate(&self, standard_rate: Decimal) -> Decimal {
        match self {
            Self::StandardRated => standard_rate,
            _ => Decimal::ZERO,
        }
    }

    /// Canonical rate under the current Singapore standard rate.
    pub fn default_rate(&self) -> Decimal {
        self.canonical_rate(SG_STANDARD_GST_RATE)
    }

    /// Parse a jurisdiction symbol; UBL letters S/Z/E are accepted too.
    /// Case-insensitive.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "SR" | "S" => Some(Self::StandardRated),
            "ZR" | "Z" => Some(Self::ZeroRated),
            "ES" | "E" => Some(Self::Exempt),
            "OS" | "O" => Some(Self::OutOfScope),
            "NG" => Some(Self::NotRegistered),
            _ => None,
        }
    }
}

/// UNTDID 1001 document type codes recognized by the SG profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceTypeCode {
    /// 380: Commercial invoice.
    Invoice,
    /// 381: Credit note.
    CreditNote,
    /// 383: Debit note.
    DebitNote,
    /// 384: Corrected invoice.
    Corrected,
    /// 386: Prepayment invoice.
    Prepayment,
    /// 389: Self-billed invoice.
    SelfBilled,
}

impl InvoiceTypeCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invoice => "380",
            Self::CreditNote => "381",
            Self::DebitNote => "383",
            Self::Corrected => "384",
            Self::Prepayment => "386",
            Self::SelfBilled => "389",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "380" => Some(Self::Invoice),
            "381" => Some(Self::CreditNote),
            "383" => Some(Self::DebitNote),
            "384" => Some(Self::Corrected),
            "386" => Some(Self::Prepayment),
            "389" => Some(Self::SelfBilled),
            _ => None,
        }
    }
}

/// BG-23: Tax breakdown per (category, rate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSubtotal {
    /// BT-118. `None` for an unrecognized caller symbol.
    pub category: Option<TaxCategory>,
    /// BT-119.
    pub rate: Decimal,
    /// BT-116.
    pub taxable_amount: Decimal,
    /// BT-117.
    pub tax_amount: Decimal,
}

/// BG-22: Document totals as declared by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonetaryTotals {
    /// BT-106: Sum of line net amounts.
    pub subtotal: Option<Decimal>,
    /// BT-109.
    pub tax_exclusive_amount: Option<Decimal>,
    /// BT-110.
    pub tax_amount: Option<Decimal>,
    /// BT-112.
    pub tax_inclusive_amount: Option<Decimal>,
    /// BT-107.
    pub allowance_total: Option<Decimal>,
    /// BT-108.
    pub charge_total: Option<Decimal>,
    /// BT-113.
    pub prepaid_amount: Option<Decimal>,
    /// BT-114.
    pub rounding_amount: Option<Decimal>,
    /// BT-115.
    pub payable_amount: Option<Decimal>,
}

/// BG-16 / BG-17: Payment means and payee account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetails {
    /// BT-81: UNTDID 4461 code (e.g. "30" credit transfer, "54" card).
    pub means_code: Option<String>,
    /// Payment due date carried in the payment means block.
    pub due_date: Option<NaiveDate>,
    /// BT-84: Payee account number.
    pub account_id: Option<String>,
    /// BT-85: Account name.
    pub account_name: Option<String>,
    /// BT-86: Bank / branch routing identifier (e.g. SWIFT code).
    pub routing_id: Option<String>,
}

impl PaymentDetails {
    /// Credit-transfer style means (30, 58) expect a payee account.
    pub fn is_credit_transfer(&self) -> bool {
        matches!(self.means_code.as_deref().map(str::trim), Some("30" | "58"))
    }
}
