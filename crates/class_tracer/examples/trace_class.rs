use class_tracer::{report, ClassTracer, TraceConfig};
use itest_common::ClassFileBuilder;

fn main() {
    let mut builder = ClassFileBuilder::new("com/example/Square");
    let area = builder.method_ref("com/example/Square", "area", "()D");
    let side = builder.field_ref("com/example/Square", "side", "D");
    let [hi, lo] = area.to_be_bytes();
    let [s_hi, s_lo] = side.to_be_bytes();
    let bytes = builder
        .super_class("com/example/Rectangle")
        .field("side", "D")
        .method("area", "()D", Some(vec![0x2a, 0xb4, s_hi, s_lo, 0x5c, 0x6b, 0xaf]))
        .method("twice", "()D", Some(vec![0x2a, 0xb6, hi, lo, 0x5c, 0x63, 0xaf]))
        .build();

    let tracer = ClassTracer::new(TraceConfig::default().kind("Shape"));
    let trace = tracer.trace_bytes(&bytes).expect("couldn't trace");

    for method in &trace.methods {
        println!("{}{}", method.name, method.signature);
        for instruction in &method.instructions {
            println!("    {}", instruction);
        }
    }
    println!("{}", report::to_json_pretty(&trace).expect("couldn't serialize"));
}
