use filespec::{MatchFlags, for_each_file};

fn main() {
    let pattern = std::env::args().nth(1).unwrap_or_else(|| String::from("*"));

    for_each_file(
        &pattern,
        MatchFlags::RETURN_FILES | MatchFlags::RETURN_DIRECTORIES,
        |path, record, depth| {
            println!("{depth} {:>10} {}", record.size, path.display());
            true
        },
    );
}
