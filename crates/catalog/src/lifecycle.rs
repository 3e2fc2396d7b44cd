//! Shared create -> read -> update -> list -> delete shape.
//!
//! A resource kind describes its calls, field sets and expected messages in a
//! [`ResourceSpec`]; [`standard`] turns it into the ordered step list. The
//! captured resource id is available to every later call as `{{<id_capture>}}`.

use serde_json::Value;

use savecheck_core::types::{BodyCheck, ExpectedOutcome, FieldPath, MessagePredicate, ResourceKind};
use savecheck_harness::{Auth, CallTemplate, Step};

/// Listing call and where its items and total live.
#[derive(Debug, Clone)]
pub struct ListSpec {
    pub call: CallTemplate,
    pub items: FieldPath,
    pub total: FieldPath,
    /// Field of each listed item holding the id.
    pub item_id_field: String,
}

/// Everything the standard lifecycle needs to know about one resource kind.
#[derive(Debug, Clone)]
pub struct ResourceSpec {
    pub kind: ResourceKind,
    /// Capture name of the created id (`save_id`, `user_id`).
    pub id_capture: String,
    /// Where the created id appears in the create response.
    pub id_path: FieldPath,
    pub create: CallTemplate,
    pub create_message: Option<MessagePredicate>,
    /// Steps run right after creation (e.g. logging in as the new user).
    pub after_create: Vec<Step>,
    /// Auth used by every call after creation.
    pub auth: Auth,
    pub read: CallTemplate,
    /// Envelope keys the record may be wrapped in (`save`, `user`/`data`).
    pub envelopes: Vec<&'static str>,
    /// Fields a read-back must echo from creation.
    pub echo: Vec<(&'static str, Value)>,
    pub update: CallTemplate,
    pub update_message: Option<MessagePredicate>,
    /// Fields whose new value a read-back must reflect after the update.
    pub updated: Vec<(&'static str, Value)>,
    pub list: Option<ListSpec>,
    pub delete: CallTemplate,
    pub delete_message: Option<MessagePredicate>,
    /// Expected outcome of reading the resource after deletion.
    pub gone: ExpectedOutcome,
}

impl ResourceSpec {
    fn field(&self, name: &str) -> FieldPath {
        FieldPath::enveloped(&self.envelopes, name)
    }

    fn placeholder(&self) -> Value {
        Value::String(format!("{{{{{}}}}}", self.id_capture))
    }

    fn expect_success(message: &Option<MessagePredicate>) -> ExpectedOutcome {
        let expected = ExpectedOutcome::success();
        match message {
            Some(predicate) => expected.message(predicate.clone()),
            None => expected,
        }
    }
}

/// Builds the standard lifecycle for `spec`.
///
/// create (capture id) -> read back (echo) -> update -> read back (updated
/// fields changed, untouched fields persist) -> list (id present, total >= 1)
/// -> delete -> read back (gone).
pub fn standard(spec: &ResourceSpec) -> Vec<Step> {
    let kind = spec.kind;
    let mut steps = Vec::new();

    steps.push(
        Step::new(
            format!("create {kind}"),
            spec.create.clone(),
            ResourceSpec::expect_success(&spec.create_message),
        )
        .capture_resource(spec.id_capture.clone(), spec.id_path.clone(), kind),
    );
    steps.extend(spec.after_create.iter().cloned());

    let echo = spec
        .echo
        .iter()
        .fold(ExpectedOutcome::success(), |expected, (name, value)| {
            expected.check(BodyCheck::Equals(spec.field(name), value.clone()))
        });
    steps.push(Step::new(
        format!("read back {kind}"),
        spec.read.clone().auth(spec.auth.clone()),
        echo,
    ));

    steps.push(Step::new(
        format!("update {kind}"),
        spec.update.clone().auth(spec.auth.clone()),
        ResourceSpec::expect_success(&spec.update_message),
    ));

    let untouched = spec
        .echo
        .iter()
        .filter(|(name, _)| !spec.updated.iter().any(|(updated, _)| updated == name));
    let verify = spec
        .updated
        .iter()
        .chain(untouched)
        .fold(ExpectedOutcome::success(), |expected, (name, value)| {
            expected.check(BodyCheck::Equals(spec.field(name), value.clone()))
        });
    steps.push(Step::new(
        format!("read updated {kind}"),
        spec.read.clone().auth(spec.auth.clone()),
        verify,
    ));

    if let Some(list) = &spec.list {
        steps.push(Step::new(
            format!("list {kind}"),
            list.call.clone().auth(spec.auth.clone()),
            ExpectedOutcome::success()
                .check(BodyCheck::IsArray(list.items.clone()))
                .check(BodyCheck::ArrayContains {
                    array: list.items.clone(),
                    field: list.item_id_field.clone(),
                    value: spec.placeholder(),
                })
                .check(BodyCheck::AtLeast(list.total.clone(), 1)),
        ));
    }

    steps.push(Step::new(
        format!("delete {kind}"),
        spec.delete.clone().auth(spec.auth.clone()),
        ResourceSpec::expect_success(&spec.delete_message),
    ));
    steps.push(Step::new(
        format!("read deleted {kind}"),
        spec.read.clone().auth(spec.auth.clone()),
        spec.gone.clone(),
    ));

    steps
}
