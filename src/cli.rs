use clap::{value_parser, crate_version, Arg, ArgAction, Command, ValueHint};

const FMT_HELP: &str = "the format is identified by the image length unless `--format` is given";
const NAME_HELP: &str = "names that are not valid CP/M names are converted, e.g., `m80......com` becomes `M80.COM`";
const FORMATS: [&str;7] = ["FDD_8IN","FDD_8IN_8MB","HDD_5MB","HDD_5MB_1024","TARBELL_FDD","FDD_1.5MB","SIMH_FDD_8IN"];

fn file_arg(help: &'static str, req: bool, shell_hint: bool) -> Arg {
    let ans = Arg::new("file").short('f').long("file").value_name("NAME").required(req).help(help);
    if shell_hint {
        ans.value_hint(ValueHint::FilePath)
    } else {
        ans
    }
}

fn indent_arg() -> Arg {
    Arg::new("indent").long("indent").help("JSON indentation, omit to minify")
        .value_name("SPACES")
        .value_parser(value_parser!(u16).range(0..16))
        .required(false)
}

fn dimg_arg(req: bool) -> Arg {
    Arg::new("dimg").short('d').long("dimg").help("path to disk image itself")
        .value_name("PATH")
        .value_hint(ValueHint::FilePath)
        .required(req)
}

fn format_arg(req: bool) -> Arg {
    Arg::new("format").short('T').long("format").help("disk format")
        .value_name("FORMAT")
        .value_parser(FORMATS)
        .ignore_case(true)
        .required(req)
}

fn verbose_arg() -> Arg {
    Arg::new("verbose").short('v').long("verbose").help("trace every sector that is accessed")
        .action(ArgAction::SetTrue)
        .global(true)
}

pub fn build_cli() -> Command {
    let long_help = "altairdsk is always invoked with exactly one of several subcommands.
Set RUST_LOG environment variable to control logging level.
  levels: trace,debug,info,warn,error

Examples:
---------
list files:            `altairdsk catalog -d cpm.dsk`
copy file out:         `altairdsk get -f asm.com -d cpm.dsk -o asm.com`
copy file in:          `altairdsk put -f stat.com -i ./stat.com -d cpm.dsk`
copy many files out:   `altairdsk mget -f *.com -d cpm.dsk --dir ./out`
create image:          `altairdsk mkdsk -T FDD_8IN -d new.dsk`";

    let mut main_cmd = Command::new("altairdsk")
        .about("Manipulates CP/M disk images for the Altair 8800.")
        .after_long_help(long_help)
        .arg(verbose_arg())
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        Command::new("catalog")
            .arg(dimg_arg(true))
            .arg(format_arg(false))
            .visible_alias("dir")
            .visible_alias("ls")
            .about("write disk image catalog to stdout")
            .after_help(FMT_HELP),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("raw")
            .arg(dimg_arg(true))
            .arg(format_arg(false))
            .about("write raw directory entries and free allocations to stdout")
            .after_help(FMT_HELP),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("stat")
            .arg(dimg_arg(false))
            .arg(format_arg(false))
            .arg(indent_arg())
            .about("write disk format parameters as a JSON string to stdout")
            .after_help("give either the disk image or the format"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("get")
            .arg(file_arg("name of file inside disk image",true,false))
            .arg(dimg_arg(true))
            .arg(format_arg(false))
            .arg(Arg::new("type").long("type").short('t').help("how to treat the data")
                .value_name("TYPE").required(false).value_parser(["auto","bin","txt"]).default_value("auto")
                .long_help("`txt` stops at the CP/M end of file mark, `auto` does the same unless 8-bit data is found"))
            .arg(Arg::new("output").long("output").short('o').help("host path to write, otherwise stdout")
                .value_name("PATH").value_hint(ValueHint::FilePath).required(false))
            .about("copy a file out of a disk image")
            .after_help(FMT_HELP),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("mget")
            .arg(Arg::new("file").short('f').long("file").help("wildcard patterns, e.g., `*.com`")
                .value_name("PATTERN").num_args(1..).required(true))
            .arg(dimg_arg(true))
            .arg(format_arg(false))
            .arg(Arg::new("type").long("type").short('t').help("how to treat the data")
                .value_name("TYPE").required(false).value_parser(["auto","bin","txt"]).default_value("auto"))
            .arg(Arg::new("dir").long("dir").help("host directory to write into")
                .value_name("DIR").value_hint(ValueHint::DirPath).required(false).default_value("."))
            .about("copy every matching file out of a disk image")
            .after_help("the pattern may need to be quoted depending on shell"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("put")
            .arg(file_arg("name of file inside disk image",true,false))
            .arg(dimg_arg(true))
            .arg(format_arg(false))
            .arg(Arg::new("input").long("input").short('i').help("host path to read, otherwise stdin")
                .value_name("PATH").value_hint(ValueHint::FilePath).required(false))
            .about("copy a file into a disk image")
            .after_help(NAME_HELP),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("mput")
            .arg(Arg::new("input").long("input").short('i').help("host files to copy")
                .value_name("PATH").value_hint(ValueHint::FilePath).num_args(1..).required(true))
            .arg(dimg_arg(true))
            .arg(format_arg(false))
            .about("copy many host files into a disk image under their own names")
            .after_help(NAME_HELP),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("delete")
            .arg(file_arg("name of file inside disk image to delete",true,false))
            .arg(dimg_arg(true))
            .arg(format_arg(false))
            .visible_alias("del")
            .visible_alias("era")
            .about("delete a file inside a disk image")
            .after_help("the space is not reclaimed until the image is opened again"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("rename")
            .arg(file_arg("name of file inside disk image to rename",true,false))
            .arg(Arg::new("name").long("name").short('n').value_name("NAME").help("new name").required(true))
            .arg(dimg_arg(true))
            .arg(format_arg(false))
            .about("rename a file inside a disk image")
            .after_help(NAME_HELP),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("chown")
            .arg(file_arg("name of file inside disk image",true,false))
            .arg(Arg::new("user").long("user").short('u').value_name("USER").help("new user number")
                .value_parser(value_parser!(u8).range(0..16)).required(true))
            .arg(dimg_arg(true))
            .arg(format_arg(false))
            .about("change the user number of a file inside a disk image"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("mkdsk")
            .arg(format_arg(true))
            .arg(Arg::new("dimg").long("dimg").short('d').value_name("PATH").help("disk image path to create")
                .value_hint(ValueHint::FilePath)
                .required(true))
            .arg(Arg::new("force").long("force").help("overwrite an existing file").action(ArgAction::SetTrue))
            .visible_alias("format")
            .about("write a freshly formatted disk image to the given path"),
    );
    main_cmd = main_cmd.subcommand(
        Command::new("completions")
            .arg(
                Arg::new("shell").short('s').long("shell").help("shell target").value_name("NAME")
                    .required(true)
                    .value_parser(["bash","elv","fish","ps1","zsh"])
            )
            .about("write completions script to stdout for the specified shell")
    );
    return main_cmd;
}
