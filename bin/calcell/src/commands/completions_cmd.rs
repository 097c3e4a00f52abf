use clap_complete::{generate, Shell};

/// Generate shell completion scripts for `cmd`.
pub fn run(shell: &str, mut cmd: clap::Command) -> anyhow::Result<()> {
    let shell = match shell.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" | "ps" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        _ => {
            anyhow::bail!(
                "Unsupported shell: {}. Options: bash, zsh, fish, powershell, elvish",
                shell
            );
        }
    };

    generate(shell, &mut cmd, "calcell", &mut std::io::stdout());

    eprintln!();
    eprintln!("# Usage:");
    match shell {
        Shell::Bash => {
            eprintln!("#   calcell completions bash > ~/.local/share/bash-completion/completions/calcell");
            eprintln!("#   or: eval \"$(calcell completions bash)\"");
        }
        Shell::Zsh => {
            eprintln!("#   calcell completions zsh > ~/.zfunc/_calcell");
            eprintln!("#   Make sure fpath includes ~/.zfunc and run compinit");
        }
        Shell::Fish => {
            eprintln!("#   calcell completions fish > ~/.config/fish/completions/calcell.fish");
        }
        _ => {}
    }

    Ok(())
}
