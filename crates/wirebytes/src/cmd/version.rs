use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("wirebytes {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: wirebytes");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", env!("WIREBYTES_BUILD_TARGET"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("prefix_widths: 1,2,3,4");
    println!("der_max_length: {}", wirebytes_cursor::der::MAX_LENGTH);

    Ok(SUCCESS)
}
