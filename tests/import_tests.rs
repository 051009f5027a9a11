use dealflow::import::{
    normalize_header, parse_contacts_csv, validate_upload, MAX_UPLOAD_BYTES,
};

#[test]
fn test_header_normalization() {
    assert_eq!(normalize_header("Full Name"), "full_name");
    assert_eq!(normalize_header("  Email "), "email");
    assert_eq!(normalize_header("Company Name"), "company_name");
    assert_eq!(normalize_header("LinkedIn URL"), "linkedin_url");
    assert_eq!(normalize_header("already_snake"), "already_snake");
}

#[test]
fn test_single_row_maps_to_normalized_record() {
    let csv = "Full Name,Email,Company Name\nJane Doe,Jane@Example.com,Acme Ventures\n";
    let parsed = parse_contacts_csv(csv.as_bytes()).unwrap();

    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.dropped, 0);
    assert!(parsed.row_errors.is_empty());

    let row = &parsed.rows[0];
    assert_eq!(row.full_name, "Jane Doe");
    // Emails are lowercased during parsing
    assert_eq!(row.email, "jane@example.com");
    assert_eq!(row.company_name, "Acme Ventures");
}

#[test]
fn test_rows_missing_all_identity_fields_are_dropped() {
    let csv = "\
Full Name,Email,Company Name,Title
Jane Doe,jane@example.com,Acme Ventures,Partner
,,,Associate
 , , ,
Bob Only Name,,,
";
    let parsed = parse_contacts_csv(csv.as_bytes()).unwrap();

    // Jane and Bob survive; the two identity-less rows are dropped silently.
    assert_eq!(parsed.rows.len(), 2);
    assert_eq!(parsed.dropped, 2);
    assert!(parsed.row_errors.is_empty());
}

#[test]
fn test_headers_match_case_insensitively() {
    let csv = "FULL NAME,EMAIL,COMPANY NAME\nJane,jane@example.com,Acme\n";
    let parsed = parse_contacts_csv(csv.as_bytes()).unwrap();
    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].full_name, "Jane");
}

#[test]
fn test_missing_optional_columns_default_to_empty() {
    let csv = "Email\njane@example.com\n";
    let parsed = parse_contacts_csv(csv.as_bytes()).unwrap();
    assert_eq!(parsed.rows.len(), 1);
    assert_eq!(parsed.rows[0].email, "jane@example.com");
    assert_eq!(parsed.rows[0].full_name, "");
    assert_eq!(parsed.rows[0].company_name, "");
}

#[test]
fn test_validate_upload_checks_extension() {
    assert!(validate_upload("contacts.csv", 100).is_ok());
    assert!(validate_upload("CONTACTS.CSV", 100).is_ok());
    assert!(validate_upload("contacts.xlsx", 100).is_err());
    assert!(validate_upload("contacts", 100).is_err());
}

#[test]
fn test_validate_upload_checks_size() {
    assert!(validate_upload("contacts.csv", 0).is_err());
    assert!(validate_upload("contacts.csv", MAX_UPLOAD_BYTES).is_ok());
    assert!(validate_upload("contacts.csv", MAX_UPLOAD_BYTES + 1).is_err());
}

#[test]
fn test_empty_file_has_no_rows() {
    let parsed = parse_contacts_csv(b"Full Name,Email,Company Name\n").unwrap();
    assert!(parsed.rows.is_empty());
    assert_eq!(parsed.dropped, 0);
}
