use notesync_core::LanguageCode;

pub fn format_language_lines() -> Vec<String> {
    LanguageCode::ALL
        .iter()
        .map(|language| format!("{:<4}{}", language.code(), language.display_name()))
        .collect()
}

pub fn run_languages() {
    for line in format_language_lines() {
        println!("{line}");
    }
}
