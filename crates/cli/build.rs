use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("pagebind")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Turn a web page into an EPUB")
        .arg(clap::arg!([URL] "Page URL or local HTML file"))
        .arg(clap::arg!([OUTPUT] "Output EPUB file").value_parser(clap::value_parser!(std::path::PathBuf)))
        .arg(clap::arg!(-c --cover <URL> "Cover image URL, absolute or relative to the page"))
        .arg(
            clap::arg!(--config <FILE> "Settings file")
                .value_name("FILE")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--lang <TAG> "Language tag for the book"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests"))
        .arg(clap::arg!(-i --interactive "Prompt for URL, cover and output name"))
        .arg(clap::arg!(-m --metadata "Print the page metadata as JSON instead of building a book"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_name("SHELL")
                .value_parser(["bash", "elvish", "fish", "powershell", "zsh"]),
        );

    for shell in [
        clap_complete::shells::Shell::Bash,
        clap_complete::shells::Shell::Zsh,
        clap_complete::shells::Shell::Fish,
        clap_complete::shells::Shell::PowerShell,
    ] {
        clap_complete::generate_to(shell, &mut cmd, "pagebind", &completions_dir).unwrap();
    }

    println!("cargo:warning=Shell completions generated in: {}", completions_dir.display());
}
