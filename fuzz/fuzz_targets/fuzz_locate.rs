#![no_main]

use carvex::domain::services::{BoundaryLocator, FormatCatalog, SignatureIndex};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let catalog = FormatCatalog::standard();
    let Ok(index) = SignatureIndex::new(&catalog) else {
        return;
    };

    for (format, starts) in index.start_offsets_by_format(data) {
        let Some(spec) = catalog.specs_for(format) else {
            continue;
        };
        assert_eq!(starts, BoundaryLocator.start_offsets(data, spec));
        for candidate in BoundaryLocator.bound(data, spec, &starts).candidates {
            assert!(candidate.end_offset() <= data.len());
        }
    }
});
