//! Domain layer tests
//!
//! Format data, the boundary locator and the structural validator.

mod common;

use carvex::domain::entities::{Candidate, FormatId};
use carvex::domain::services::{
    BoundaryLocator, FormatCatalog, SignatureIndex, StructuralValidator, Verdict,
};
use common::{GIF, JPEG, PNG, scenario_volume};
use rstest::*;

// ============================================================================
// FormatId Tests
// ============================================================================

#[rstest]
#[case(FormatId::Jpeg, "jpg")]
#[case(FormatId::Png, "png")]
#[case(FormatId::Gif, "gif")]
#[case(FormatId::Bmp, "bmp")]
#[case(FormatId::WebP, "webp")]
fn test_format_extension(#[case] format: FormatId, #[case] expected: &str) {
    assert_eq!(format.extension(), expected);
    assert_eq!(expected.parse::<FormatId>().unwrap(), format);
}

#[rstest]
#[case(FormatId::Jpeg, 4, Some(2))]
#[case(FormatId::Png, 1, Some(8))]
#[case(FormatId::Gif, 2, Some(1))]
#[case(FormatId::Bmp, 1, None)]
#[case(FormatId::WebP, 1, None)]
fn test_builtin_signature_table(
    #[case] format: FormatId,
    #[case] start_variants: usize,
    #[case] end_len: Option<usize>,
) {
    let spec = FormatCatalog::standard().specs_for(format).copied().unwrap();
    assert_eq!(spec.start_signatures().len(), start_variants);
    assert_eq!(spec.end_signature().map(<[u8]>::len), end_len);
    assert_eq!(spec.max_object_size(), 20 * 1024 * 1024);
}

// ============================================================================
// BoundaryLocator Tests
// ============================================================================

#[fixture]
fn catalog() -> FormatCatalog {
    FormatCatalog::standard()
}

#[rstest]
fn test_scenario_candidates(catalog: FormatCatalog) {
    let volume = scenario_volume();
    let jpeg = catalog.specs_for(FormatId::Jpeg).unwrap();
    let png = catalog.specs_for(FormatId::Png).unwrap();

    assert_eq!(
        BoundaryLocator.locate(&volume, jpeg),
        vec![
            Candidate::new(FormatId::Jpeg, 1024, 1024 + JPEG.len()),
            Candidate::new(FormatId::Jpeg, 1704, 1704 + JPEG.len()),
        ]
    );
    assert_eq!(
        BoundaryLocator.locate(&volume, png),
        vec![Candidate::new(FormatId::Png, 1637, 1637 + PNG.len())]
    );
}

#[rstest]
fn test_candidates_respect_the_size_window(catalog: FormatCatalog) {
    let mut volume = vec![0u8; 16];
    volume.extend_from_slice(GIF);
    let catalog = catalog
        .with_max_object_size(FormatId::Gif, GIF.len() as u64 - 1)
        .unwrap();
    let spec = catalog.specs_for(FormatId::Gif).unwrap();

    let location = BoundaryLocator.locate_detailed(&volume, spec);
    assert_eq!(location.starts, 1);
    assert_eq!(location.unbounded, 1);
    assert!(location.candidates.is_empty());
}

#[rstest]
fn test_every_candidate_is_within_bounds(catalog: FormatCatalog) {
    let volume = scenario_volume();
    for spec in catalog.specs() {
        for candidate in BoundaryLocator.locate(&volume, spec) {
            assert!(candidate.start_offset() < candidate.end_offset());
            assert!(candidate.end_offset() <= volume.len());
            assert!(candidate.len() as u64 <= spec.max_object_size());
        }
    }
}

#[rstest]
fn test_single_pass_index_matches_locator(catalog: FormatCatalog) {
    let mut volume = scenario_volume();
    volume.extend_from_slice(GIF);
    volume.extend_from_slice(b"BMxxRIFFxxBM");

    let index = SignatureIndex::new(&catalog).unwrap();
    for (format, starts) in index.start_offsets_by_format(&volume) {
        let spec = catalog.specs_for(format).unwrap();
        assert_eq!(starts, BoundaryLocator.start_offsets(&volume, spec));
        assert_eq!(
            BoundaryLocator.bound(&volume, spec, &starts).candidates,
            BoundaryLocator.locate(&volume, spec)
        );
    }
}

// ============================================================================
// StructuralValidator Tests
// ============================================================================

#[fixture]
fn validator() -> StructuralValidator {
    StructuralValidator::default()
}

#[rstest]
#[case(JPEG, FormatId::Jpeg)]
#[case(PNG, FormatId::Png)]
#[case(GIF, FormatId::Gif)]
fn test_fixtures_validate(validator: StructuralValidator, #[case] bytes: &[u8], #[case] format: FormatId) {
    assert_eq!(validator.check(bytes, format), Verdict::Valid);
}

#[rstest]
#[case(JPEG, FormatId::Png, Verdict::BadHeader)]
#[case(PNG, FormatId::Gif, Verdict::BadHeader)]
#[case(GIF, FormatId::Jpeg, Verdict::BadHeader)]
#[case(GIF, FormatId::Bmp, Verdict::BadHeader)]
#[case(PNG, FormatId::WebP, Verdict::BadHeader)]
fn test_wrong_format_is_rejected(
    validator: StructuralValidator,
    #[case] bytes: &[u8],
    #[case] format: FormatId,
    #[case] expected: Verdict,
) {
    assert_eq!(validator.check(bytes, format), expected);
}

#[rstest]
fn test_jpeg_without_structure_markers_is_rejected(validator: StructuralValidator) {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(200, 0x00);
    bytes.extend_from_slice(&[0xFF, 0xD9]);
    assert_eq!(validator.check(&bytes, FormatId::Jpeg), Verdict::MissingStructure);
}

#[rstest]
fn test_png_missing_idat_is_rejected(validator: StructuralValidator) {
    let bytes: Vec<u8> = PNG
        .windows(4)
        .position(|w| w == b"IDAT")
        .map(|at| {
            let mut copy = PNG.to_vec();
            copy[at..at + 4].copy_from_slice(b"IDAX");
            copy
        })
        .unwrap();
    assert_eq!(validator.check(&bytes, FormatId::Png), Verdict::MissingStructure);
}

#[rstest]
#[case(63, Verdict::TooSmall)]
#[case(64, Verdict::Valid)]
fn test_floor_boundary(validator: StructuralValidator, #[case] len: usize, #[case] expected: Verdict) {
    let mut bytes = b"BM".to_vec();
    bytes.resize(len, 0);
    assert_eq!(validator.check(&bytes, FormatId::Bmp), expected);
}

#[rstest]
fn test_verdict_reasons_are_distinct() {
    let reasons = [
        Verdict::Valid,
        Verdict::TooSmall,
        Verdict::BadHeader,
        Verdict::BadTrailer,
        Verdict::MissingStructure,
    ]
    .map(|v| v.reason());
    let mut unique = reasons.to_vec();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), reasons.len());
}
