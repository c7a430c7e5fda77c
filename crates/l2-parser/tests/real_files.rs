//! Decoding real products, skipped when the files are not available.

use chrono::Datelike;
use l2_parser::{days_to_datetime, read_dbl, DecodeOptions, FieldSelection};
use test_utils::{real_products, require_test_file};

#[test]
fn test_real_baseline_c_product() {
    let path = require_test_file!(real_products::BASELINE_C);
    let product = read_dbl(&path, &DecodeOptions::unpacked()).unwrap();

    let headers = product.headers.as_ref().expect("baseline C products carry headers");
    assert!(headers.mph.value("PRODUCT").is_some());
    assert!(product.n_records() > 0);

    let table = product
        .to_table(&FieldSelection::default_for(product.identity.baseline))
        .unwrap();
    let mask = table.mask().unwrap();
    let days = table.column("days_J2k").unwrap();

    for (i, valid) in mask.iter().enumerate() {
        let value = days.get_f64(i).unwrap();
        if *valid {
            // Mission lifetime
            let dt = days_to_datetime(value).unwrap();
            assert!((2010..2040).contains(&dt.year()));
        } else {
            assert!(value.is_nan());
        }
    }
}
