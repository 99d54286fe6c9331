use prefix_code::{bits, FrequencyTable, PrefixTree};

fn main() -> prefix_code::Result<()> {
    let s = String::from("Hello my name is Sam!");
    let tree = PrefixTree::huffman(&FrequencyTable::from_symbols(s.bytes()))?;

    let out = tree.encode(s.bytes())?;
    let dec = String::from_utf8(tree.decode(&out)?);

    println!("{}", bits::to_bit_string(&out));
    println!("{:?}", dec);
    Ok(())
}
