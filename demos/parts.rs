use filespec::{FileSystem, OsFileSystem, decompose};

fn main() {
    let path = std::env::args().nth(1).expect("usage: parts <path>");

    let full_path = OsFileSystem::new().full_path(&path).unwrap();
    let components = decompose(&full_path, false);

    println!("{components:#?}");
}
