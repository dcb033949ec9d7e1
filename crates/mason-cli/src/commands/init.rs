use miette::Result;

use mason_util::errors::MasonError;

const MAIN_STUB: &str = r#"#include <iostream>

int main()
{
    std::cout << "Hello from Mason!" << std::endl;
    return 0;
}
"#;

pub fn exec(name: Option<&str>) -> Result<()> {
    let cwd = std::env::current_dir().map_err(MasonError::Io)?;
    let manifest_path = cwd.join(mason_core::MANIFEST_FILE);

    if manifest_path.exists() {
        return Err(MasonError::Generic {
            message: "Mason.toml already exists in this directory".to_string(),
        }
        .into());
    }

    let dir_name = cwd
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app")
        .to_string();
    let name = name.unwrap_or(&dir_name);

    let manifest = format!(
        r#"[project]
name = "{name}"

[build]
flags = ["-std=c++17", "-Wall"]
include-paths = ["."]
source-dirs = ["src"]
"#
    );
    std::fs::write(&manifest_path, manifest).map_err(MasonError::Io)?;

    let src_dir = cwd.join("src");
    std::fs::create_dir_all(&src_dir).map_err(MasonError::Io)?;
    let main_path = src_dir.join("main.cpp");
    if !main_path.exists() {
        std::fs::write(&main_path, MAIN_STUB).map_err(MasonError::Io)?;
    }

    println!("Initialized Mason project in {}", cwd.display());
    Ok(())
}
