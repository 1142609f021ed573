use std::io::Read;

use pdx_parse::Parser;
use pdx_tokenizer::{Profile, Tokenizer};

fn main() {
    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source).unwrap();

    println!("=== Tokens ===");
    for tok in Tokenizer::new(&source, Profile::Full) {
        println!("{:?}", tok);
    }

    println!("\n=== Tree ===");
    match Parser::new(&source, Profile::Full).strict(false).parse() {
        Ok(tree) => println!("{:#?}", tree),
        Err(e) => eprintln!("{}", e.render("<stdin>", &source)),
    }
}
