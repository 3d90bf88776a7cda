/// Source-file extensions keyed by the short language name AtCoder reports,
/// i.e. the label with its compiler suffix and version digits removed.
const LANGUAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("Ada", ".adb"),
    ("Awk", ".awk"),
    ("Bash", ".sh"),
    ("Brainfuck", ".bf"),
    ("C", ".c"),
    ("C#", ".cs"),
    ("C++", ".cpp"),
    ("COBOL - Fixed", ".cob"),
    ("COBOL - Free", ".cob"),
    ("Ceylon", ".ceylon"),
    ("Clojure", ".clj"),
    ("Common Lisp", ".lisp"),
    ("Crystal", ".cr"),
    ("Cython", ".pyx"),
    ("D", ".d"),
    ("Dart", ".dart"),
    ("Dash", ".sh"),
    ("Elixir", ".ex"),
    ("Erlang", ".erl"),
    ("F#", ".fs"),
    ("Forth", ".fs"),
    ("Fortran", ".f08"),
    ("Go", ".go"),
    ("Haskell", ".hs"),
    ("Haxe", ".hx"),
    ("IOI-Style C++", ".cpp"),
    ("Java", ".java"),
    ("JavaScript", ".js"),
    ("Julia", ".jl"),
    ("Kotlin", ".kt"),
    ("Lua", ".lua"),
    ("LuaJIT", ".lua"),
    ("MoonScript", ".moon"),
    ("Nim", ".nim"),
    ("OCaml", ".ml"),
    ("Objective-C", ".m"),
    ("Octave", ".m"),
    ("PHP", ".php"),
    ("Pascal", ".pas"),
    ("Perl", ".pl"),
    ("Perl6", ".p6"),
    ("Prolog", ".pl"),
    ("PyPy", ".py"),
    ("Python", ".py"),
    ("Racket", ".rkt"),
    ("Raku", ".p6"),
    ("Ruby", ".rb"),
    ("Rust", ".rs"),
    ("Scala", ".scala"),
    ("Scheme", ".scm"),
    ("Sed", ".sed"),
    ("Standard ML", ".sml"),
    ("Swift", ".swift"),
    ("Text", ".txt"),
    ("TypeScript", ".ts"),
    ("Unlambda", ".unl"),
    ("Vim", ".vim"),
    ("Visual Basic", ".vb"),
    ("Zsh", ".sh"),
    ("bc", ".bc"),
    ("dc", ".dc"),
];

/// The one language whose name legitimately ends in a digit.
const DIGIT_SUFFIXED_LANGUAGE: &str = "Perl6";

/// Reduces a label such as "C++14 (GCC 9.2.1)" to its bare name, "C++".
pub fn short_language_name(language: &str) -> &str {
    let name = language.split('(').next().unwrap_or_default().trim();
    if name == DIGIT_SUFFIXED_LANGUAGE {
        name
    } else {
        // Newer labels put a space before the version, as in "C++ 20"
        name.trim_end_matches(|c: char| c.is_ascii_digit()).trim_end()
    }
}

/// The file extension, including its leading dot, for a submission's language label.
pub fn extension_for_language(language: &str) -> Option<&'static str> {
    let name = short_language_name(language);
    LANGUAGE_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|&(_, ext)| ext)
}
