mod common;

use common::{column_values, donation_records, fields, records};
use donor_ledger::identity::{
    DonorKey, IdentityError, parse_sender, record_tax_id, resolve_key, select_donor_records,
};

#[test]
fn clicking_a_bin_suffixed_name_resolves_clean_key() {
    let records = records(r#"[{"ФИО": "Иванов И.И. БИН: 12345", "Сумма": "500"}]"#);
    let key = resolve_key(&records[0], "Иванов И.И. БИН: 12345", &fields()).unwrap();
    assert_eq!(key.as_str(), "Иванов И.И.");
}

#[test]
fn clicking_another_cell_still_uses_the_name() {
    let records = records(r#"[{"ФИО": "Петрова Анна", "Сумма": "500"}]"#);
    let key = resolve_key(&records[0], "500", &fields()).unwrap();
    assert_eq!(key.as_str(), "Петрова Анна");
}

#[test]
fn nameless_record_falls_back_to_clicked_value() {
    let records = records(r#"[{"E-mail": "anna@example.kz"}]"#);
    let key = resolve_key(&records[0], " anna@example.kz ", &fields()).unwrap();
    assert_eq!(key.as_str(), "anna@example.kz");
}

#[test]
fn blank_name_and_blank_click_signal_no_identity() {
    let records = records(r#"[{"ФИО": "  ", "Сумма": 10}]"#);
    assert_eq!(
        resolve_key(&records[0], "   ", &fields()),
        Err(IdentityError::NoIdentity)
    );
    assert_eq!(DonorKey::new("БИН: 123"), Err(IdentityError::NoIdentity));
}

#[test]
fn name_key_widens_to_shared_tax_id() {
    let records = donation_records();
    let key = DonorKey::new("иванов").unwrap();
    let selected = select_donor_records(&records, &key, &fields());
    assert_eq!(
        column_values(&selected, "ФИО"),
        ["Иванов Иван БИН: 123456789012", "Иванов Иван"]
    );
}

#[test]
fn tax_id_key_requires_exact_digits() {
    let records = donation_records();
    let exact = DonorKey::new("123456789012").unwrap();
    assert_eq!(select_donor_records(&records, &exact, &fields()).len(), 2);
    let partial = DonorKey::new("1234567890").unwrap();
    assert!(select_donor_records(&records, &partial, &fields()).is_empty());
}

#[test]
fn sender_tax_id_finds_bank_statement_rows() {
    let records = donation_records();
    let key = DonorKey::new("987654321098").unwrap();
    let selected = select_donor_records(&records, &key, &fields());
    assert_eq!(selected.len(), 1);
    assert_eq!(record_tax_id(selected[0], &fields()).as_deref(), Some("987654321098"));
}

#[test]
fn email_key_matches_only_that_address() {
    let records = donation_records();
    let key = DonorKey::new("ANNA@example.kz").unwrap();
    let selected = select_donor_records(&records, &key, &fields());
    assert_eq!(column_values(&selected, "ФИО"), ["Петрова Анна"]);
    let other = DonorKey::new("anna@example.com").unwrap();
    assert!(select_donor_records(&records, &other, &fields()).is_empty());
}

#[test]
fn sender_without_tax_id_keeps_name_only() {
    let parsed = parse_sender("ИП Сергеев\nБИК: HSBKKZKX");
    assert_eq!(parsed.name.as_deref(), Some("ИП Сергеев"));
    assert_eq!(parsed.tax_id, None);
}
