// Host-side tests for the link-creation form and its messages.

use candle_wish::celebration::{RecipientError, Variant};
use candle_wish::create::{is_create_path, CreateForm};
use candle_wish::phrases;

const ORIGIN: &str = "https://example.com";

#[test]
fn empty_name_is_rejected_with_a_message() {
    let mut form = CreateForm::new();
    let err = form.submit("   ", ORIGIN).unwrap_err();
    assert_eq!(err, RecipientError::Empty);
    assert!(form.created().is_none());

    let notice = phrases::create_error_notice(&err);
    assert_eq!(notice.title, "خطأ");
    assert_eq!(notice.body, "الرجاء إدخال اسم");
}

#[test]
fn overlong_name_is_rejected() {
    let mut form = CreateForm::new();
    let err = form.submit(&"n".repeat(51), ORIGIN).unwrap_err();
    assert_eq!(err, RecipientError::TooLong(51));
    assert!(phrases::create_error_notice(&err).body.contains("50"));
}

#[test]
fn submit_builds_the_celebration_link() {
    let mut form = CreateForm::new();
    form.select(Variant::Female);
    let link = form.submit(" Sara ", ORIGIN).unwrap().clone();
    assert_eq!(link.recipient.name(), "Sara");
    assert_eq!(link.path, "/Sara?gender=female");
    assert_eq!(link.url, "https://example.com/Sara?gender=female");
    assert_eq!(form.created(), Some(&link));

    let notice = phrases::created_notice(&link.recipient);
    assert_eq!(notice.body, "تم إنشاء احتفال لـ Sara");
}

#[test]
fn male_link_has_no_query_and_names_are_encoded() {
    let mut form = CreateForm::new();
    assert_eq!(form.variant(), Variant::Male);
    let link = form.submit("Omar Ali", ORIGIN).unwrap();
    assert_eq!(link.path, "/Omar%20Ali");
}

#[test]
fn changing_variant_or_resetting_clears_the_link() {
    let mut form = CreateForm::new();
    form.submit("Omar", ORIGIN).unwrap();
    form.select(Variant::Male);
    assert!(form.created().is_some());
    form.select(Variant::Female);
    assert!(form.created().is_none());

    form.submit("Sara", ORIGIN).unwrap();
    form.reset();
    assert!(form.created().is_none());
    assert_eq!(form.variant(), Variant::Female);
}

#[test]
fn create_path_is_recognised() {
    assert!(is_create_path("/create"));
    assert!(is_create_path("/create/"));
    assert!(!is_create_path("/Sara"));
    assert!(!is_create_path("/"));
}

#[test]
fn copy_messages() {
    assert_eq!(phrases::copied_notice().title, "تم نسخ الرابط");
    assert_eq!(phrases::copy_failed_notice().title, "فشل نسخ الرابط");
    assert_eq!(phrases::copy_label(false), "نسخ");
    assert_eq!(phrases::copy_label(true), "تم النسخ");
}
