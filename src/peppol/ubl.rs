use rust_decimal::Decimal;

use super::xml_tree::{Element, format_amount, format_percent, format_quantity, write_document};
use super::{CAC_NS, CBC_NS, CREDIT_NOTE_NS, INVOICE_NS};
use crate::core::totals;
use crate::core::*;

/// UNECE 5153 tax scheme identifier used by the SG profile.
const GST_SCHEME: &str = "GST";

/// ISO 6523 ICD for GTIN standard item identifiers.
const GTIN_SCHEME: &str = "0160";

/// Payment means emitted when a payment block carries no code (credit transfer).
const DEFAULT_PAYMENT_MEANS: &str = "30";

/// Writes UBL 2.1 Invoice and CreditNote documents for a national profile.
#[derive(Debug, Clone, Default)]
pub struct UblWriter {
    profile: Profile,
}

impl UblWriter {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Serialize to an XML string.
    pub fn write(&self, invoice: &Invoice) -> Result<String, InvoiceError> {
        let xml = write_document(&self.document(invoice)?)?;
        tracing::debug!(
            number = %invoice.invoice_number,
            bytes = xml.len(),
            "serialized UBL document"
        );
        Ok(xml)
    }

    /// Build the document tree without writing it. Fails only when a derived
    /// amount does not fit the decimal range.
    pub fn document(&self, invoice: &Invoice) -> Result<Element, InvoiceError> {
        let credit = invoice.is_credit_note();
        let currency = self.currency(invoice);
        let (root_name, root_ns, type_tag) = if credit {
            ("CreditNote", CREDIT_NOTE_NS, "cbc:CreditNoteTypeCode")
        } else {
            ("Invoice", INVOICE_NS, "cbc:InvoiceTypeCode")
        };
        let type_code = match invoice.type_code.trim() {
            "" => InvoiceTypeCode::Invoice.code(),
            code => code,
        };

        let mut root = Element::new(root_name)
            .attr("xmlns", root_ns)
            .attr("xmlns:cac", CAC_NS)
            .attr("xmlns:cbc", CBC_NS)
            // BT-24 / BT-23
            .child(Element::text("cbc:CustomizationID", &self.profile.customization_id))
            .child(Element::text("cbc:ProfileID", &self.profile.profile_id))
            // BT-1
            .child(Element::text("cbc:ID", &invoice.invoice_number))
            // BT-2 / BT-9
            .child_opt(invoice.issue_date.map(|d| Element::text("cbc:IssueDate", d.to_string())))
            .child_opt(invoice.due_date.map(|d| Element::text("cbc:DueDate", d.to_string())))
            // BT-3 / BT-7 / BT-5
            .child(Element::text(type_tag, type_code))
            .child_opt(
                invoice
                    .tax_point_date
                    .map(|d| Element::text("cbc:TaxPointDate", d.to_string())),
            )
            .child(Element::text("cbc:DocumentCurrencyCode", currency))
            // BT-10
            .child_opt(
                invoice
                    .buyer_reference
                    .as_ref()
                    .map(|r| Element::text("cbc:BuyerReference", r)),
            )
            // BT-22
            .children(invoice.notes.iter().map(|n| Element::text("cbc:Note", n)));

        // BT-12
        if let Some(contract) = &invoice.contract_reference {
            root.push(
                Element::new("cac:ContractDocumentReference").child(Element::text("cbc:ID", contract)),
            );
        }
        // BG-3 / BT-25
        if let Some(preceding) = &invoice.preceding_invoice_ref {
            root.push(
                Element::new("cac:BillingReference").child(
                    Element::new("cac:InvoiceDocumentReference")
                        .child(Element::text("cbc:ID", preceding)),
                ),
            );
        }

        // BG-4 / BG-7
        root.push(
            Element::new("cac:AccountingSupplierParty").child(self.party(&invoice.seller, true)),
        );
        root.push(
            Element::new("cac:AccountingCustomerParty").child(self.party(&invoice.buyer, false)),
        );

        // BG-16
        if let Some(payment) = &invoice.payment {
            root.push(payment_means(payment));
        }

        let (computed_subtotals, computed) =
            totals::recompute(invoice, self.profile.standard_gst_rate)
                .ok_or_else(|| overflow(invoice, "document totals"))?;
        let subtotals = if invoice.tax_subtotals.is_empty() {
            &computed_subtotals
        } else {
            &invoice.tax_subtotals
        };

        // BG-23
        let tax_amount = match invoice.totals.tax_amount {
            Some(tax) => tax,
            None => totals::checked_sum(subtotals.iter().map(|s| s.tax_amount))
                .ok_or_else(|| overflow(invoice, "tax total"))?,
        };
        root.push(
            Element::new("cac:TaxTotal")
                .child(amount("cbc:TaxAmount", tax_amount, currency))
                .children(subtotals.iter().map(|s| self.tax_subtotal(s, currency))),
        );

        // BG-22
        root.push(monetary_total(&invoice.totals, &computed, currency));

        // BG-25
        for line in &invoice.items {
            let amount = totals::effective_line_amount(line)
                .ok_or_else(|| overflow(invoice, &format!("line {}", line.id)))?;
            root.push(self.line(line, amount, credit, currency));
        }

        Ok(root)
    }

    fn currency<'a>(&'a self, invoice: &'a Invoice) -> &'a str {
        match invoice.currency_code.trim() {
            "" => self.profile.default_currency.as_str(),
            c => c,
        }
    }

    fn party(&self, party: &Party, is_seller: bool) -> Element {
        let mut el = Element::new("cac:Party");

        // BT-34 / BT-49: Electronic address
        let endpoint = party
            .peppol_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .map(|id| ParticipantId::split(id, &self.profile.participant_scheme))
            .or_else(|| {
                party
                    .uen
                    .as_deref()
                    .filter(|u| !u.trim().is_empty())
                    .map(|uen| ParticipantId {
                        scheme: self.profile.participant_scheme.clone(),
                        value: uen.trim().to_string(),
                    })
            });
        if let Some(id) = endpoint {
            el.push(Element::text("cbc:EndpointID", id.value).attr("schemeID", id.scheme));
        }

        if let Some(uen) = &party.uen {
            el.push(
                Element::new("cac:PartyIdentification").child(
                    Element::text("cbc:ID", uen).attr("schemeID", &self.profile.participant_scheme),
                ),
            );
        }

        if let Some(trading) = &party.trading_name {
            el.push(Element::new("cac:PartyName").child(Element::text("cbc:Name", trading)));
        }

        let address = &party.address;
        let country = match address.country_code.trim() {
            "" => self.profile.default_country.as_str(),
            c => c,
        };
        el.push(
            Element::new("cac:PostalAddress")
                .child_opt(address.street.as_ref().map(|s| Element::text("cbc:StreetName", s)))
                .child_opt(
                    address
                        .additional
                        .as_ref()
                        .map(|s| Element::text("cbc:AdditionalStreetName", s)),
                )
                .child(Element::text(
                    "cbc:CityName",
                    address.city.as_deref().unwrap_or(&self.profile.default_city),
                ))
                .child_opt(address.postal_code.as_ref().map(|p| Element::text("cbc:PostalZone", p)))
                .child(
                    Element::new("cac:Country").child(Element::text("cbc:IdentificationCode", country)),
                ),
        );

        // BT-31
        if is_seller {
            if let Some(gst) = &party.gst_number {
                el.push(
                    Element::new("cac:PartyTaxScheme")
                        .child(Element::text("cbc:CompanyID", gst))
                        .child(tax_scheme()),
                );
            }
        }

        el.push(
            Element::new("cac:PartyLegalEntity")
                .child(Element::text("cbc:RegistrationName", &party.name))
                .child_opt(party.uen.as_ref().map(|u| Element::text("cbc:CompanyID", u))),
        );

        if let Some(contact) = party.contact.as_ref().filter(|c| !c.is_empty()) {
            el.push(
                Element::new("cac:Contact")
                    .child_opt(contact.name.as_ref().map(|n| Element::text("cbc:Name", n)))
                    .child_opt(contact.phone.as_ref().map(|p| Element::text("cbc:Telephone", p)))
                    .child_opt(
                        contact
                            .email
                            .as_ref()
                            .map(|e| Element::text("cbc:ElectronicMail", e)),
                    ),
            );
        }

        el
    }

    fn tax_category(&self, category: Option<TaxCategory>, rate: Decimal, tag: &str) -> Element {
        Element::new(tag)
            .child(Element::text(
                "cbc:ID",
                category.map(|c| c.ubl_code()).unwrap_or_default(),
            ))
            .child(Element::text("cbc:Percent", format_percent(rate)))
            .child(tax_scheme())
    }

    fn tax_subtotal(&self, subtotal: &TaxSubtotal, currency: &str) -> Element {
        Element::new("cac:TaxSubtotal")
            .child(amount("cbc:TaxableAmount", subtotal.taxable_amount, currency))
            .child(amount("cbc:TaxAmount", subtotal.tax_amount, currency))
            .child(self.tax_category(subtotal.category, subtotal.rate, "cac:TaxCategory"))
    }

    fn line(&self, line: &LineItem, line_amount: Decimal, credit: bool, currency: &str) -> Element {
        let (tag, qty_tag) = if credit {
            ("cac:CreditNoteLine", "cbc:CreditedQuantity")
        } else {
            ("cac:InvoiceLine", "cbc:InvoicedQuantity")
        };

        let mut el = Element::new(tag)
            .child(Element::text("cbc:ID", &line.id))
            .child(
                Element::text(qty_tag, format_quantity(line.quantity.unwrap_or_default()))
                    .attr("unitCode", &line.unit_code),
            )
            .child(amount("cbc:LineExtensionAmount", line_amount, currency));

        // BG-27 / BG-28
        if let Some(discount) = line.discount.filter(|d| !d.is_zero()) {
            el.push(allowance_charge(false, Some("Discount"), discount, currency));
        }
        for ac in &line.allowances {
            el.push(allowance_charge(ac.is_charge, ac.reason.as_deref(), ac.amount, currency));
        }

        let rate = line.tax_rate.unwrap_or_else(|| {
            line.tax_category
                .map(|c| c.canonical_rate(self.profile.standard_gst_rate))
                .unwrap_or_default()
        });

        let item = Element::new("cac:Item")
            .child_opt(line.description.as_ref().map(|d| Element::text("cbc:Description", d)))
            .child(Element::text("cbc:Name", line.display_name().unwrap_or_default()))
            .child_opt(line.buyer_item_id.as_ref().map(|id| {
                Element::new("cac:BuyersItemIdentification").child(Element::text("cbc:ID", id))
            }))
            .child_opt(line.seller_item_id.as_ref().map(|id| {
                Element::new("cac:SellersItemIdentification").child(Element::text("cbc:ID", id))
            }))
            .child_opt(line.standard_item_id.as_ref().map(|id| {
                Element::new("cac:StandardItemIdentification")
                    .child(Element::text("cbc:ID", id).attr("schemeID", GTIN_SCHEME))
            }))
            .child(self.tax_category(line.tax_category, rate, "cac:ClassifiedTaxCategory"));

        el.push(item);
        el.push(
            Element::new("cac:Price").child(amount(
                "cbc:PriceAmount",
                line.unit_price.unwrap_or_default(),
                currency,
            )),
        );
        el
    }
}

fn overflow(invoice: &Invoice, what: &str) -> InvoiceError {
    InvoiceError::AmountOverflow(format!("{what} of {}", invoice.invoice_number))
}

fn amount(tag: &str, value: Decimal, currency: &str) -> Element {
    Element::text(tag, format_amount(value)).attr("currencyID", currency)
}

fn tax_scheme() -> Element {
    Element::new("cac:TaxScheme").child(Element::text("cbc:ID", GST_SCHEME))
}

fn allowance_charge(is_charge: bool, reason: Option<&str>, value: Decimal, currency: &str) -> Element {
    Element::new("cac:AllowanceCharge")
        .child(Element::text("cbc:ChargeIndicator", is_charge.to_string()))
        .child_opt(reason.map(|r| Element::text("cbc:AllowanceChargeReason", r)))
        .child(amount("cbc:Amount", value, currency))
}

fn payment_means(payment: &PaymentDetails) -> Element {
    let code = payment
        .means_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_PAYMENT_MEANS);

    let account = payment.account_id.as_ref().map(|id| {
        Element::new("cac:PayeeFinancialAccount")
            .child(Element::text("cbc:ID", id))
            .child_opt(payment.account_name.as_ref().map(|n| Element::text("cbc:Name", n)))
            .child_opt(payment.routing_id.as_ref().map(|r| {
                Element::new("cac:FinancialInstitutionBranch").child(Element::text("cbc:ID", r))
            }))
    });

    Element::new("cac:PaymentMeans")
        .child(Element::text("cbc:PaymentMeansCode", code))
        .child_opt(
            payment
                .due_date
                .map(|d| Element::text("cbc:PaymentDueDate", d.to_string())),
        )
        .child_opt(account)
}

/// Declared totals win; undeclared ones come from the calculator.
/// Optional adjustments are omitted when absent or zero.
fn monetary_total(declared: &MonetaryTotals, computed: &MonetaryTotals, currency: &str) -> Element {
    let pick = |d: Option<Decimal>, c: Option<Decimal>| d.or(c).unwrap_or_default();
    let optional = |tag: &str, v: Option<Decimal>| {
        v.filter(|x| !x.is_zero()).map(|x| amount(tag, x, currency))
    };

    Element::new("cac:LegalMonetaryTotal")
        .child(amount(
            "cbc:LineExtensionAmount",
            pick(declared.subtotal, computed.subtotal),
            currency,
        ))
        .child(amount(
            "cbc:TaxExclusiveAmount",
            pick(declared.tax_exclusive_amount, computed.tax_exclusive_amount),
            currency,
        ))
        .child(amount(
            "cbc:TaxInclusiveAmount",
            pick(declared.tax_inclusive_amount, computed.tax_inclusive_amount),
            currency,
        ))
        .child_opt(optional("cbc:AllowanceTotalAmount", declared.allowance_total))
        .child_opt(optional("cbc:ChargeTotalAmount", declared.charge_total))
        .child_opt(optional("cbc:PrepaidAmount", declared.prepaid_amount))
        .child_opt(optional("cbc:PayableRoundingAmount", declared.rounding_amount))
        .child(amount(
            "cbc:PayableAmount",
            pick(declared.payable_amount, computed.payable_amount),
            currency,
        ))
}
