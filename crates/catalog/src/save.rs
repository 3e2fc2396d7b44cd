//! Save resource scenarios.

use serde_json::{Value, json};

use savecheck_core::codes;
use savecheck_core::types::{BodyCheck, ExpectedOutcome, FieldPath, MessagePredicate, ResourceKind};
use savecheck_harness::{Auth, CallTemplate, Scenario, SessionRequirement, Step};

use crate::endpoints::{SAVE_CREATE, SAVE_DELETE, SAVE_GET, SAVE_LIST, SAVE_UPDATE};
use crate::lifecycle::{self, ListSpec, ResourceSpec};

const MSG_CREATED: &str = "创建成功";
const MSG_FETCHED: &str = "获取成功";
const MSG_UPDATED: &str = "更新成功";
const MSG_DELETED: &str = "删除成功";
const MSG_NOT_FOUND: &str = "保存项不存在";

const MISSING_PARAM_MESSAGES: [&str; 2] = ["缺少必需参数", "请求参数不合法"];
const BAD_PAGINATION_MESSAGES: [&str; 2] = ["分页参数非法", "请求参数不合法"];

const UNKNOWN_SAVE_ID: &str = "999999999999";
const MISSING_SAVE_ID: &str = "not_exist_save_id";

/// Number of saves created by the list scenario.
pub const LIST_CREATIONS: usize = 5;

fn save_id_path() -> FieldPath {
    FieldPath::any(["/save_id", "/data/save_id"])
}

fn record(field: &str) -> FieldPath {
    FieldPath::enveloped(&["save", "data"], field)
}

fn create_call(name: &str) -> CallTemplate {
    CallTemplate::post(SAVE_CREATE).json(json!({
        "save_name": name,
        "save_data": "内容",
        "save_type": "novel",
        "save_description": "章节1",
    }))
}

fn create_step(name: &str) -> Step {
    Step::new(
        "create save",
        create_call(name),
        ExpectedOutcome::success().message_eq(MSG_CREATED),
    )
    .capture_resource("save_id", save_id_path(), ResourceKind::Save)
}

fn get_call(save_id: &str) -> CallTemplate {
    CallTemplate::get(SAVE_GET).query("save_id", save_id)
}

fn not_found() -> ExpectedOutcome {
    ExpectedOutcome::not_found().message_eq(MSG_NOT_FOUND)
}

/// Every save scenario, in execution order.
pub fn scenarios() -> Vec<Scenario> {
    vec![
        create_success(),
        create_missing_params(),
        get_success(),
        get_not_found(),
        get_missing_params(),
        update_success(),
        update_not_found(),
        update_missing_params(),
        delete_success(),
        delete_not_found(),
        delete_missing_params(),
        delete_twice(),
        list_success(),
        list_missing_params(),
        lifecycle(),
    ]
}

fn create_success() -> Scenario {
    Scenario::new("save/create/success").step(
        Step::new(
            "create save",
            create_call("测试存档"),
            ExpectedOutcome::success()
                .message_eq(MSG_CREATED)
                .check(BodyCheck::NonEmpty(save_id_path())),
        )
        .capture_resource("save_id", save_id_path(), ResourceKind::Save),
    )
}

/// The backend currently accepts a create without content; both outcomes are
/// part of the contract until it validates the body.
fn create_missing_params() -> Scenario {
    Scenario::new("save/create/missing-params").step(Step::new(
        "create without content",
        CallTemplate::post(SAVE_CREATE).json(json!({"save_name": "缺少内容"})),
        ExpectedOutcome::status([codes::STATUS_OK, codes::STATUS_BAD_REQUEST]),
    ))
}

fn get_success() -> Scenario {
    Scenario::new("save/get/success")
        .step(create_step("Get测试存档"))
        .step(Step::new(
            "get save",
            get_call("{{save_id}}"),
            ExpectedOutcome::success()
                .message_eq(MSG_FETCHED)
                .check(BodyCheck::Equals(record("save_id"), json!("{{save_id}}")))
                .check(BodyCheck::Equals(record("save_name"), json!("Get测试存档")))
                .check(BodyCheck::Equals(record("save_type"), json!("novel"))),
        ))
}

fn get_not_found() -> Scenario {
    Scenario::new("save/get/not-found").step(Step::new(
        "get unknown save",
        get_call(UNKNOWN_SAVE_ID),
        not_found(),
    ))
}

fn get_missing_params() -> Scenario {
    Scenario::new("save/get/missing-params").step(Step::new(
        "get without save_id",
        CallTemplate::get(SAVE_GET),
        ExpectedOutcome::status([codes::STATUS_BAD_REQUEST]),
    ))
}

fn update_success() -> Scenario {
    let updated = [
        ("save_name", "已更新名称"),
        ("save_data", "已更新内容"),
        ("save_description", "已更新描述"),
    ];
    let verify = updated
        .iter()
        .fold(ExpectedOutcome::success(), |expected, (field, value)| {
            expected.check(BodyCheck::Equals(record(field), json!(value)))
        });

    Scenario::new("save/update/success")
        .step(create_step("Update测试存档"))
        .step(Step::new(
            "update save",
            CallTemplate::put(SAVE_UPDATE).json(json!({
                "save_id": "{{save_id}}",
                "save_name": "已更新名称",
                "save_data": "已更新内容",
                "save_type": "novel",
                "save_description": "已更新描述",
            })),
            ExpectedOutcome::success().message_eq(MSG_UPDATED),
        ))
        .step(Step::new("read updated save", get_call("{{save_id}}"), verify))
}

fn update_not_found() -> Scenario {
    Scenario::new("save/update/not-found").step(Step::new(
        "update unknown save",
        CallTemplate::put(SAVE_UPDATE).json(json!({
            "save_id": MISSING_SAVE_ID,
            "save_name": "xxx",
            "save_data": "xxx",
            "save_type": "novel",
            "save_description": "xxx",
        })),
        not_found(),
    ))
}

fn update_missing_params() -> Scenario {
    Scenario::new("save/update/missing-params").step(Step::new(
        "update without save_id",
        CallTemplate::put(SAVE_UPDATE).json(json!({
            "save_name": "xxx",
            "save_data": "xxx",
            "save_type": "novel",
        })),
        ExpectedOutcome::bad_request().message_contains_any(MISSING_PARAM_MESSAGES),
    ))
}

fn delete_call(save_id: &str) -> CallTemplate {
    CallTemplate::delete(SAVE_DELETE).json(json!({"save_id": save_id}))
}

fn delete_success() -> Scenario {
    Scenario::new("save/delete/success")
        .step(create_step("Delete测试存档"))
        .step(Step::new(
            "delete save",
            delete_call("{{save_id}}"),
            ExpectedOutcome::success().message_eq(MSG_DELETED),
        ))
        .step(Step::new(
            "read deleted save",
            get_call("{{save_id}}"),
            ExpectedOutcome::not_found(),
        ))
}

fn delete_not_found() -> Scenario {
    Scenario::new("save/delete/not-found").step(Step::new(
        "delete unknown save",
        delete_call(MISSING_SAVE_ID),
        not_found(),
    ))
}

fn delete_missing_params() -> Scenario {
    Scenario::new("save/delete/missing-params").step(Step::new(
        "delete without save_id",
        CallTemplate::delete(SAVE_DELETE).json(json!({})),
        ExpectedOutcome::bad_request().message_contains_any(MISSING_PARAM_MESSAGES),
    ))
}

fn delete_twice() -> Scenario {
    Scenario::new("save/delete/twice")
        .step(create_step("Delete测试存档"))
        .step(Step::new(
            "delete save",
            delete_call("{{save_id}}"),
            ExpectedOutcome::success(),
        ))
        .step(Step::new(
            "delete save again",
            delete_call("{{save_id}}"),
            ExpectedOutcome::status([
                codes::STATUS_OK,
                codes::STATUS_BAD_REQUEST,
                codes::STATUS_NOT_FOUND,
            ])
            .not_codes(codes::SUCCESS_CODES),
        ))
}

/// Runs on a disposable account so the listing only holds this scenario's saves.
fn list_success() -> Scenario {
    let captures: Vec<String> = (0..LIST_CREATIONS).map(|i| format!("save_id_{i}")).collect();

    let mut scenario =
        Scenario::new("save/list/success").session(SessionRequirement::Disposable);
    for (i, capture) in captures.iter().enumerate() {
        scenario = scenario.step(
            Step::new(
                format!("create save {i}"),
                create_call(&format!("list测试存档{i}")),
                ExpectedOutcome::success(),
            )
            .capture_resource(capture.clone(), save_id_path(), ResourceKind::Save),
        );
    }

    let listed = FieldPath::any(["/saves", "/data/saves"]);
    let expected = captures.iter().fold(
        ExpectedOutcome::success()
            .message_eq(MSG_FETCHED)
            .check(BodyCheck::IsArray(listed.clone()))
            .check(BodyCheck::AtLeast(
                FieldPath::any(["/total", "/data/total"]),
                LIST_CREATIONS as i64,
            )),
        |expected, capture| {
            expected.check(BodyCheck::ArrayContains {
                array: listed.clone(),
                field: "save_id".to_owned(),
                value: Value::String(format!("{{{{{capture}}}}}")),
            })
        },
    );

    scenario.step(Step::new(
        "list saves",
        CallTemplate::get(SAVE_LIST)
            .query("page", "1")
            .query("page_size", "10"),
        expected,
    ))
}

fn list_missing_params() -> Scenario {
    Scenario::new("save/list/missing-params").step(Step::new(
        "list without pagination",
        CallTemplate::get(SAVE_LIST),
        ExpectedOutcome::bad_request().message_contains_any(BAD_PAGINATION_MESSAGES),
    ))
}

/// Resource description used by the full save lifecycle.
pub fn resource_spec() -> ResourceSpec {
    ResourceSpec {
        kind: ResourceKind::Save,
        id_capture: "save_id".to_owned(),
        id_path: save_id_path(),
        create: CallTemplate::post(SAVE_CREATE).json(json!({
            "save_name": "X",
            "save_data": "Y",
            "save_type": "novel",
        })),
        create_message: Some(MessagePredicate::Equals(MSG_CREATED.to_owned())),
        after_create: Vec::new(),
        auth: Auth::Session,
        read: get_call("{{save_id}}"),
        envelopes: vec!["save", "data"],
        echo: vec![
            ("save_id", json!("{{save_id}}")),
            ("save_name", json!("X")),
            ("save_data", json!("Y")),
            ("save_type", json!("novel")),
        ],
        update: CallTemplate::put(SAVE_UPDATE).json(json!({
            "save_id": "{{save_id}}",
            "save_description": "Z",
        })),
        update_message: Some(MessagePredicate::Equals(MSG_UPDATED.to_owned())),
        updated: vec![("save_description", json!("Z"))],
        list: Some(ListSpec {
            call: CallTemplate::get(SAVE_LIST)
                .query("page", "1")
                .query("page_size", "10"),
            items: FieldPath::any(["/saves", "/data/saves"]),
            total: FieldPath::any(["/total", "/data/total"]),
            item_id_field: "save_id".to_owned(),
        }),
        delete: delete_call("{{save_id}}"),
        delete_message: Some(MessagePredicate::Equals(MSG_DELETED.to_owned())),
        gone: ExpectedOutcome::not_found(),
    }
}

fn lifecycle() -> Scenario {
    Scenario::new("save/lifecycle")
        .session(SessionRequirement::Disposable)
        .steps(lifecycle::standard(&resource_spec()))
}
