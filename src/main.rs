// FolderIcon - Folder Icon Updater
// Assigns and refreshes custom folder icons through desktop.ini

use std::process;

fn main() {
    match foldericon::run() {
        Ok(code) => process::exit(code),
        Err(e)   => {
            eprintln!("{}", e);
            process::exit(e.exit_code());
        }
    }
}
