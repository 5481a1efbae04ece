use vergen::{BuildBuilder, Emitter, RustcBuilder};
use vergen_git2::Git2Builder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_date(true).build()?;
    let rustc = RustcBuilder::default().semver(true).build()?;

    // crates.io tarballs carry no git metadata; fall back to a placeholder sha.
    let git2_result = Git2Builder::default().sha(true).build();

    match git2_result {
        Ok(git2) => {
            Emitter::default()
                .add_instructions(&build)?
                .add_instructions(&rustc)?
                .add_instructions(&git2)?
                .emit()?;
        }
        Err(_) => {
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
            Emitter::default()
                .add_instructions(&build)?
                .add_instructions(&rustc)?
                .emit()?;
        }
    }

    Ok(())
}
