//! Form submissions: field sanitising, honeypot detection, and assembly of
//! the plain-text email subjects and bodies.
//!
//! Two body shapes exist. Draft bodies back the `mailto:` flow and carry no
//! kind tag; relay bodies are dispatched through the mail transport and lead
//! with a `Kind:` line so a shared inbox can filter on it.

/// Strip carriage returns and surrounding whitespace from a submitted value.
pub fn scrub(value: &str) -> String {
    value.replace('\r', "").trim().to_string()
}

/// A populated honeypot field marks the submission as automated spam.
pub fn honeypot_tripped(company: &str) -> bool {
    !company.trim().is_empty()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Order,
    Contact,
}

impl SubmissionKind {
    /// Wire value mapping: `"order"` is an order, anything else is contact.
    pub fn from_wire(kind: &str) -> Self {
        if kind == "order" {
            Self::Order
        } else {
            Self::Contact
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Order => "order",
            Self::Contact => "contact",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub topic: String,
    pub message: String,
}

impl ContactFields {
    pub fn scrubbed(&self) -> Self {
        Self {
            name: scrub(&self.name),
            email: scrub(&self.email),
            topic: scrub(&self.topic),
            message: scrub(&self.message),
        }
    }
}

/// Pickup-slot fields filled by the map widget and schedule inputs. All
/// optional; the block is omitted from the email when every field is blank.
#[derive(Debug, Clone, Default)]
pub struct PickupFields {
    pub datetime: String,
    pub location_label: String,
    pub lat: String,
    pub lng: String,
}

impl PickupFields {
    pub fn is_blank(&self) -> bool {
        self.datetime.is_empty()
            && self.location_label.is_empty()
            && self.lat.is_empty()
            && self.lng.is_empty()
    }

    pub fn scrubbed(&self) -> Self {
        Self {
            datetime: scrub(&self.datetime),
            location_label: scrub(&self.location_label),
            lat: scrub(&self.lat),
            lng: scrub(&self.lng),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderFields {
    pub product_id: String,
    pub product_name: String,
    pub qty: String,
    pub variant: String,
    pub pickup: PickupFields,
    pub name: String,
    pub email: String,
    pub notes: String,
}

impl OrderFields {
    pub fn scrubbed(&self) -> Self {
        Self {
            product_id: scrub(&self.product_id),
            product_name: scrub(&self.product_name),
            qty: scrub(&self.qty),
            variant: scrub(&self.variant),
            pickup: self.pickup.scrubbed(),
            name: scrub(&self.name),
            email: scrub(&self.email),
            notes: scrub(&self.notes),
        }
    }
}

/// Subject plus plain-text body, ready for a `mailto:` URL or the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

/// Draft for the contact form `mailto:` flow.
pub fn contact_draft(page_key: &str, fields: &ContactFields) -> EmailDraft {
    let fields = fields.scrubbed();
    let topic = or_default(&fields.topic, "contact");
    let name = or_default(&fields.name, "anonymous");

    EmailDraft {
        subject: format!("[{page_key}] {topic} — {name}"),
        body: format!(
            "Page: {page_key}\n\
             Name: {}\n\
             Email: {}\n\
             Topic: {}\n\
             \n\
             Message:\n\
             {}\n",
            fields.name, fields.email, fields.topic, fields.message
        ),
    }
}

/// Draft for the order form `mailto:` flow.
pub fn order_draft(page_key: &str, fields: &OrderFields) -> EmailDraft {
    let fields = fields.scrubbed();
    let item = or_default(&fields.product_name, "Item");
    let qty = or_default(&fields.qty, "1");
    let variant = or_default(&fields.variant, "Default");

    EmailDraft {
        subject: format!("[{page_key}] Order request — {item}"),
        body: format!(
            "Page: {page_key}\n\
             Item: {item}\n\
             Quantity: {qty}\n\
             Variant: {variant}\n\
             \n\
             Name: {}\n\
             Email: {}\n\
             \n\
             Notes:\n\
             {}\n",
            fields.name, fields.email, fields.notes
        ),
    }
}

/// Kind-tagged message for a relayed contact submission.
pub fn contact_message(page_key: &str, fields: &ContactFields) -> EmailDraft {
    let page_key = scrub(page_key);
    let fields = fields.scrubbed();
    let topic = or_default(&fields.topic, "inquiry");

    EmailDraft {
        subject: format!("[{page_key}] Contact — {topic}"),
        body: format!(
            "Kind: contact\n\
             Page: {page_key}\n\
             \n\
             Name: {}\n\
             Email: {}\n\
             Topic: {}\n\
             \n\
             Message:\n\
             {}\n",
            fields.name, fields.email, fields.topic, fields.message
        ),
    }
}

/// Kind-tagged message for a relayed order submission. The pickup block is
/// present only when at least one pickup field was submitted.
pub fn order_message(page_key: &str, fields: &OrderFields) -> EmailDraft {
    let page_key = scrub(page_key);
    let fields = fields.scrubbed();

    let pickup_part = if fields.pickup.is_blank() {
        String::new()
    } else {
        format!(
            "\nPickup:\n\
             When: {}\n\
             Where: {}\n\
             Coordinates: {} {}\n",
            fields.pickup.datetime,
            fields.pickup.location_label,
            fields.pickup.lat,
            fields.pickup.lng
        )
    };

    EmailDraft {
        subject: format!("[{page_key}] Order — {}", fields.product_name),
        body: format!(
            "Kind: order\n\
             Page: {page_key}\n\
             \n\
             Product: {} ({})\n\
             Qty: {}\n\
             Variant: {}\n\
             {pickup_part}\n\
             Name: {}\n\
             Email: {}\n\
             \n\
             Notes:\n\
             {}\n",
            fields.product_name,
            fields.product_id,
            fields.qty,
            fields.variant,
            fields.name,
            fields.email,
            fields.notes
        ),
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrub_strips_carriage_returns_and_whitespace() {
        assert_eq!(scrub("  two\r\nlines \r"), "two\nlines");
    }

    #[test]
    fn honeypot_requires_non_whitespace_content() {
        assert!(!honeypot_tripped(""));
        assert!(!honeypot_tripped("   "));
        assert!(honeypot_tripped("Acme Ltd"));
    }

    #[test]
    fn kind_defaults_to_contact() {
        assert_eq!(SubmissionKind::from_wire("order"), SubmissionKind::Order);
        assert_eq!(SubmissionKind::from_wire("contact"), SubmissionKind::Contact);
        assert_eq!(SubmissionKind::from_wire("anything"), SubmissionKind::Contact);
    }

    #[test]
    fn contact_message_body_layout() {
        let draft = contact_message(
            "shop",
            &ContactFields {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                topic: "repair".to_string(),
                message: "The handle came loose.\r\nCan you fix it?".to_string(),
            },
        );

        assert_eq!(draft.subject, "[shop] Contact — repair");
        insta::assert_snapshot!(draft.body, @r"
        Kind: contact
        Page: shop

        Name: Ada
        Email: ada@example.com
        Topic: repair

        Message:
        The handle came loose.
        Can you fix it?
        ");
    }

    #[test]
    fn order_message_includes_pickup_block_when_present() {
        let draft = order_message(
            "shop",
            &OrderFields {
                product_id: "mug".to_string(),
                product_name: "Mug".to_string(),
                qty: "2".to_string(),
                variant: "Sand".to_string(),
                pickup: PickupFields {
                    datetime: "2026-03-01T10:00".to_string(),
                    location_label: "Market stall".to_string(),
                    lat: "52.52".to_string(),
                    lng: "13.405".to_string(),
                },
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                notes: "Gift wrap please".to_string(),
            },
        );

        assert_eq!(draft.subject, "[shop] Order — Mug");
        insta::assert_snapshot!(draft.body, @r"
        Kind: order
        Page: shop

        Product: Mug (mug)
        Qty: 2
        Variant: Sand

        Pickup:
        When: 2026-03-01T10:00
        Where: Market stall
        Coordinates: 52.52 13.405

        Name: Ada
        Email: ada@example.com

        Notes:
        Gift wrap please
        ");
    }

    #[test]
    fn order_message_omits_pickup_block_when_blank() {
        let draft = order_message(
            "shop",
            &OrderFields {
                product_id: "mug".to_string(),
                product_name: "Mug".to_string(),
                qty: "1".to_string(),
                variant: "Blue".to_string(),
                ..Default::default()
            },
        );

        assert!(!draft.body.contains("Pickup:"));
        assert!(draft.body.starts_with("Kind: order\nPage: shop\n"));
        assert!(draft.body.contains("Variant: Blue\n\nName:"));
    }

    #[test]
    fn order_draft_applies_field_fallbacks() {
        let draft = order_draft("shop", &OrderFields::default());

        assert_eq!(draft.subject, "[shop] Order request — Item");
        assert!(draft.body.contains("Quantity: 1\n"));
        assert!(draft.body.contains("Variant: Default\n"));
    }

    #[test]
    fn contact_draft_subject_fallbacks() {
        let draft = contact_draft("home", &ContactFields::default());
        assert_eq!(draft.subject, "[home] contact — anonymous");
    }
}
