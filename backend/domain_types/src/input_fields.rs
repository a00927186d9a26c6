//! Settings-form descriptors an adapter hands to the host for rendering.
//!
//! The builder accumulates an ordered list of fields; a label may carry
//! attached children (the input it labels, tooltips). `attach` keeps the
//! historical non-throwing contract: an invalid attach returns an error
//! value and leaves the receiver untouched, it never panics.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldKind {
    Text,
    Password,
    Hidden,
    Checkbox,
    Select,
    Label,
    Tooltip,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum AttachError {
    #[error("only label fields accept attachments")]
    ReceiverNotLabel,
    #[error("a label cannot be attached to another label")]
    LabelOnLabel,
}

/// One node in the settings form. Select fields carry their options;
/// everything else ignores `options`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InputField {
    pub kind: FieldKind,
    pub name: String,
    pub label: Option<String>,
    pub value: Option<String>,
    pub options: BTreeMap<String, String>,
    pub attached: Vec<InputField>,
}

impl InputField {
    fn new(kind: FieldKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            label: None,
            value: None,
            options: BTreeMap::new(),
            attached: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Text, name)
    }

    pub fn password(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Password, name)
    }

    pub fn hidden(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Hidden, name)
    }

    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(FieldKind::Checkbox, name)
    }

    pub fn select(
        name: impl Into<String>,
        options: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        let mut field = Self::new(FieldKind::Select, name);
        field.options = options.into_iter().collect();
        field
    }

    pub fn label(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(FieldKind::Label, name).with_label(text)
    }

    pub fn tooltip(text: impl Into<String>) -> Self {
        let mut field = Self::new(FieldKind::Tooltip, "tooltip");
        field.value = Some(text.into());
        field
    }

    pub fn with_label(mut self, text: impl Into<String>) -> Self {
        self.label = Some(text.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Attach a child node to this label. Fails without modifying the
    /// receiver when the receiver is not a label or the child is one.
    pub fn attach(&mut self, node: InputField) -> Result<(), AttachError> {
        if self.kind != FieldKind::Label {
            return Err(AttachError::ReceiverNotLabel);
        }
        if node.kind == FieldKind::Label {
            return Err(AttachError::LabelOnLabel);
        }
        self.attached.push(node);
        Ok(())
    }
}

/// Ordered collection of fields making up one settings form.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct InputFields {
    pub fields: Vec<InputField>,
}

impl InputFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: InputField) -> &mut Self {
        self.fields.push(field);
        self
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|field| field.name.as_str())
            .collect()
    }
}
