#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vulnscout_engine::ManifestDetector;

const FILE_NAMES: [&str; 8] = [
    "requirements.txt",
    "package.json",
    "package-lock.json",
    "pom.xml",
    "go.mod",
    "Gemfile",
    "Gemfile.lock",
    "build.gradle",
];

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    name_index: u8,
    content: &'a str,
}

fuzz_target!(|input: Input<'_>| {
    let detector = ManifestDetector::new();
    let file_name = FILE_NAMES[input.name_index as usize % FILE_NAMES.len()];

    if let Ok(parsed) = detector.parse(input.content, file_name) {
        assert_eq!(detector.detect_ecosystem(file_name), Some(parsed.ecosystem));
    }
});
