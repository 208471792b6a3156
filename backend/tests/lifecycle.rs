use form_backend::auth::Caller;
use form_backend::error::FormError;
use form_backend::services::forms::lifecycle::{
    create_form, delete_form, get_form_data, get_form_list, submit_form,
};
use form_backend::store::{FormStore, SqliteStore, StoreError, TABLES};
use form_common::model::answer::Answer;
use form_common::model::field_type::FieldType;
use form_common::model::form::{FieldDefinition, Form, StoredResponse};
use std::collections::HashMap;

fn store() -> SqliteStore {
    SqliteStore::open_in_memory().expect("open in-memory store")
}

fn fields_of(store: &SqliteStore, form: &Form) -> Vec<FieldDefinition> {
    store.find_fields(&form.id).expect("load fields")
}

fn field<'a>(fields: &'a [FieldDefinition], text: &str) -> &'a FieldDefinition {
    fields
        .iter()
        .find(|field| field.text == text)
        .unwrap_or_else(|| panic!("no field named {text}"))
}

/// A complete, valid submission: first option for single choices, every
/// option for checkboxes.
fn answers(fields: &[FieldDefinition], name: &str) -> HashMap<String, Answer> {
    fields
        .iter()
        .map(|field| {
            let answer = match field.field_type {
                FieldType::Text => Answer::from(name),
                FieldType::Email => Answer::from("  User@Example.COM "),
                FieldType::Checkbox => {
                    Answer::Many(field.options.iter().map(|o| o.id.clone()).collect())
                }
                FieldType::Radio | FieldType::Dropdown => Answer::from(field.options[0].id.as_str()),
                FieldType::File => Answer::from("https://files.example.com/cv.pdf"),
                FieldType::Date => Answer::from("2024-03-05"),
                FieldType::Time => Answer::from("08:00"),
            };
            (field.id.clone(), answer)
        })
        .collect()
}

fn response_for<'a>(responses: &'a [StoredResponse], field: &FieldDefinition) -> &'a StoredResponse {
    responses
        .iter()
        .find(|response| response.field_id == field.id)
        .expect("response for field")
}

#[test]
fn create_form_instantiates_the_fixed_template() {
    let mut store = store();
    let alice = Caller::new("alice");

    let form = create_form(&mut store, &alice, "Trip Survey").expect("create form");
    assert_eq!(form.name, "Trip Survey");
    assert_eq!(form.owner_id, "alice");

    let fields = fields_of(&store, &form);
    let layout: Vec<(&str, FieldType, usize)> = fields
        .iter()
        .map(|f| (f.text.as_str(), f.field_type, f.options.len()))
        .collect();
    assert_eq!(
        layout,
        vec![
            ("Name", FieldType::Text, 0),
            ("Email", FieldType::Email, 0),
            ("Occupation", FieldType::Checkbox, 3),
            ("Gender", FieldType::Radio, 3),
            ("Country", FieldType::Dropdown, 3),
            ("File", FieldType::File, 0),
            ("Date of Birth", FieldType::Date, 0),
            ("Time of Arrival", FieldType::Time, 0),
        ]
    );

    let countries: Vec<&str> = field(&fields, "Country")
        .options
        .iter()
        .map(|o| o.text.as_str())
        .collect();
    assert_eq!(countries, vec!["USA", "Canada", "Mexico"]);
}

#[test]
fn blank_name_is_rejected_without_writing() {
    let mut store = store();
    let err = create_form(&mut store, &Caller::new("alice"), "   ").expect_err("blank name");
    assert!(matches!(err, FormError::BadRequest(_)));
    assert_eq!(store.count_rows("forms").unwrap(), 0);
    assert_eq!(store.count_rows("form_fields").unwrap(), 0);
}

#[test]
fn row_counts_only_accept_schema_tables() {
    let mut store = store();
    create_form(&mut store, &Caller::new("alice"), "Kept").unwrap();

    for table in ["forms; DROP TABLE forms", "sqlite_master", ""] {
        assert!(matches!(
            store.count_rows(table),
            Err(StoreError::UnknownTable(name)) if name == table
        ));
    }
    assert_eq!(store.count_rows("forms").unwrap(), 1);
    for table in TABLES {
        assert!(store.count_rows(table).is_ok(), "{table}");
    }
}

#[test]
fn form_list_is_scoped_to_the_owner() {
    let mut store = store();
    let alice = Caller::new("alice");
    let bob = Caller::new("bob");

    create_form(&mut store, &alice, "One").unwrap();
    create_form(&mut store, &alice, "Two").unwrap();
    create_form(&mut store, &bob, "Three").unwrap();

    let mut names: Vec<String> = get_form_list(&store, &alice)
        .unwrap()
        .into_iter()
        .map(|form| form.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["One", "Two"]);
    assert_eq!(get_form_list(&store, &Caller::new("carol")).unwrap(), Vec::new());
}

#[test]
fn submit_stores_normalized_answers_in_their_shape() {
    let mut store = store();
    let alice = Caller::new("alice");
    let form = create_form(&mut store, &alice, "Trip Survey").unwrap();
    let fields = fields_of(&store, &form);

    submit_form(&mut store, &alice, &form.id, &answers(&fields, "  Alice ")).expect("submit");

    let detail = get_form_data(&store, &alice, &form.id).unwrap().expect("form detail");
    assert_eq!(detail.responses.len(), 8);

    let name = response_for(&detail.responses, field(&fields, "Name"));
    assert_eq!(name.value.as_deref(), Some("Alice"));

    let email = response_for(&detail.responses, field(&fields, "Email"));
    assert_eq!(email.value.as_deref(), Some("user@example.com"));

    let occupation_field = field(&fields, "Occupation");
    let occupation = response_for(&detail.responses, occupation_field);
    assert_eq!(occupation.value, None);
    assert_eq!(occupation.option_ids.len(), 3);

    let gender_field = field(&fields, "Gender");
    let gender = response_for(&detail.responses, gender_field);
    assert_eq!(gender.option_ids, vec![gender_field.options[0].id.clone()]);

    assert!(detail.form.updated_at_ms >= form.updated_at_ms);
}

#[test]
fn resubmitting_updates_instead_of_duplicating() {
    let mut store = store();
    let alice = Caller::new("alice");
    let form = create_form(&mut store, &alice, "Trip Survey").unwrap();
    let fields = fields_of(&store, &form);

    submit_form(&mut store, &alice, &form.id, &answers(&fields, "First")).unwrap();
    let first = get_form_data(&store, &alice, &form.id).unwrap().unwrap();

    let mut second = answers(&fields, "Second");
    let gender = field(&fields, "Gender");
    second.insert(gender.id.clone(), Answer::from(gender.options[2].id.as_str()));
    let occupation = field(&fields, "Occupation");
    second.insert(
        occupation.id.clone(),
        Answer::Many(vec![occupation.options[1].id.clone()]),
    );
    submit_form(&mut store, &alice, &form.id, &second).unwrap();

    assert_eq!(store.count_rows("field_responses").unwrap(), 8);
    // 1 occupation + 1 gender + 1 country
    assert_eq!(store.count_rows("response_options").unwrap(), 3);

    let after = get_form_data(&store, &alice, &form.id).unwrap().unwrap();
    let name_before = response_for(&first.responses, field(&fields, "Name"));
    let name_after = response_for(&after.responses, field(&fields, "Name"));
    assert_eq!(name_before.id, name_after.id);
    assert_eq!(name_after.value.as_deref(), Some("Second"));

    assert_eq!(
        response_for(&after.responses, gender).option_ids,
        vec![gender.options[2].id.clone()]
    );
    assert_eq!(
        response_for(&after.responses, occupation).option_ids,
        vec![occupation.options[1].id.clone()]
    );
}

#[test]
fn users_only_see_their_own_responses() {
    let mut store = store();
    let alice = Caller::new("alice");
    let bob = Caller::new("bob");
    let form = create_form(&mut store, &alice, "Shared").unwrap();
    let fields = fields_of(&store, &form);

    submit_form(&mut store, &bob, &form.id, &answers(&fields, "Bob")).unwrap();

    let for_alice = get_form_data(&store, &alice, &form.id).unwrap().unwrap();
    assert!(for_alice.responses.is_empty());
    assert_eq!(for_alice.fields.len(), 8);

    let for_bob = get_form_data(&store, &bob, &form.id).unwrap().unwrap();
    assert!(for_bob.responses.iter().all(|r| r.user_id == "bob"));
    assert_eq!(for_bob.responses.len(), 8);
}

#[test]
fn invalid_submission_writes_nothing() {
    let mut store = store();
    let alice = Caller::new("alice");
    let form = create_form(&mut store, &alice, "Trip Survey").unwrap();
    let fields = fields_of(&store, &form);

    let mut submitted = answers(&fields, "Alice");
    submitted.insert(field(&fields, "Time of Arrival").id.clone(), Answer::from("24:00"));
    submitted.remove(&field(&fields, "File").id);

    match submit_form(&mut store, &alice, &form.id, &submitted) {
        Err(FormError::Validation(errors)) => {
            let failing: Vec<&str> = errors.field_ids().collect();
            assert_eq!(
                failing,
                vec![
                    field(&fields, "File").id.as_str(),
                    field(&fields, "Time of Arrival").id.as_str()
                ]
            );
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(store.count_rows("field_responses").unwrap(), 0);
}

#[test]
fn options_of_another_field_are_rejected() {
    let mut store = store();
    let alice = Caller::new("alice");
    let form = create_form(&mut store, &alice, "Trip Survey").unwrap();
    let fields = fields_of(&store, &form);

    let mut submitted = answers(&fields, "Alice");
    let country_option = field(&fields, "Country").options[0].id.clone();
    submitted.insert(field(&fields, "Gender").id.clone(), Answer::from(country_option.as_str()));

    let err = submit_form(&mut store, &alice, &form.id, &submitted).unwrap_err();
    assert!(matches!(err, FormError::Validation(_)));
}

#[test]
fn unknown_forms_are_not_found() {
    let mut store = store();
    let alice = Caller::new("alice");

    assert!(get_form_data(&store, &alice, "missing").unwrap().is_none());
    assert!(matches!(
        submit_form(&mut store, &alice, "missing", &HashMap::new()),
        Err(FormError::NotFound(_))
    ));
    assert!(matches!(
        delete_form(&mut store, &alice, "missing"),
        Err(FormError::NotFound(_))
    ));
}

#[test]
fn delete_removes_every_dependent_row() {
    let mut store = store();
    let alice = Caller::new("alice");
    let bob = Caller::new("bob");
    let doomed = create_form(&mut store, &alice, "Doomed").unwrap();
    let kept = create_form(&mut store, &alice, "Kept").unwrap();

    for form in [&doomed, &kept] {
        let fields = fields_of(&store, form);
        submit_form(&mut store, &alice, &form.id, &answers(&fields, "Alice")).unwrap();
        submit_form(&mut store, &bob, &form.id, &answers(&fields, "Bob")).unwrap();
    }

    delete_form(&mut store, &alice, &doomed.id).expect("delete form");

    assert!(store.find_form(&doomed.id).unwrap().is_none());
    assert!(store.find_fields(&doomed.id).unwrap().is_empty());
    assert!(store.find_responses(&doomed.id, "bob").unwrap().is_empty());

    // Only the kept form's rows remain.
    assert_eq!(store.count_rows("forms").unwrap(), 1);
    assert_eq!(store.count_rows("form_fields").unwrap(), 8);
    assert_eq!(store.count_rows("field_options").unwrap(), 9);
    assert_eq!(store.count_rows("field_responses").unwrap(), 16);
    assert_eq!(store.count_rows("response_options").unwrap(), 10);
}

#[test]
fn only_the_owner_may_delete() {
    let mut store = store();
    let form = create_form(&mut store, &Caller::new("alice"), "Mine").unwrap();

    let err = delete_form(&mut store, &Caller::new("mallory"), &form.id).unwrap_err();
    assert!(matches!(err, FormError::Unauthorized));
    assert!(store.find_form(&form.id).unwrap().is_some());
}

#[test]
fn failed_write_rolls_back_the_whole_unit() {
    let mut store = store();
    let form = Form {
        id: "f-1".to_string(),
        name: "Partial".to_string(),
        owner_id: "alice".to_string(),
        created_at_ms: 1,
        updated_at_ms: 1,
    };

    let result = store.write(|writer| -> Result<(), StoreError> {
        writer.insert_form(&form)?;
        writer.insert_form(&form)
    });
    assert!(matches!(result, Err(StoreError::Conflict(_))));

    for table in TABLES {
        assert_eq!(store.count_rows(table).unwrap(), 0, "{table} not empty");
    }
}

#[test]
fn second_response_row_for_the_same_user_conflicts() {
    let mut store = store();
    let alice = Caller::new("alice");
    let form = create_form(&mut store, &alice, "Race").unwrap();
    let name = fields_of(&store, &form)
        .into_iter()
        .find(|f| f.field_type == FieldType::Text)
        .unwrap();

    let row = |id: &str| StoredResponse {
        id: id.to_string(),
        field_id: name.id.clone(),
        user_id: "alice".to_string(),
        value: Some("Alice".to_string()),
        option_ids: Vec::new(),
        updated_at_ms: 1,
    };

    store
        .write(|writer| writer.insert_response(&row("r-1")))
        .expect("first row");
    let err = store
        .write(|writer| writer.insert_response(&row("r-2")))
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert_eq!(store.count_rows("field_responses").unwrap(), 1);
}
