#![no_main]

use carvex::domain::entities::FormatId;
use carvex::domain::services::StructuralValidator;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let validator = StructuralValidator::default();
    for format in FormatId::ALL {
        let _ = validator.check(data, format);
    }
});
