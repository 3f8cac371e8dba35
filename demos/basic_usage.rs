//! Basic usage example for teclient
//!
//! Run with: cargo run --example basic_usage

use teclient::{Error, FixedBuffer, GrowableBuffer, KeyValue, UpdateEncoder};

fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<(), Error> {
    println!("teclient Basic Usage Example");
    println!("============================");

    // Example 1: growable buffer, the common case
    println!("\n1. Update with defaults and events (growable buffer):");
    {
        let mut update = UpdateEncoder::new(GrowableBuffer::new(), 1337, "bass-o-matic")?;

        update.set_device_id("serial-0042")?;
        update.add_defaults(&[KeyValue::string("modelVer", "102")])?;

        update.add_event(
            "powerOn",
            1_700_000_000, // timestamp
            1,             // sequence
            &[
                KeyValue::string("description", "shiny"),
                KeyValue::int32("temperature", 98),
            ],
        )?;

        println!("  Encoded {} bytes into {} capacity", update.used(), update.capacity());
        println!("  {}", hex_dump(update.as_slice()));
    }

    // Example 2: fixed buffer with graceful exhaustion
    println!("\n2. Fixed buffer fills up without corrupting the update:");
    {
        let mut storage = [0u8; 96];
        let mut update = UpdateEncoder::new(FixedBuffer::new(&mut storage), 1337, "tiny")?;

        let mut accepted = 0;
        loop {
            let result = update.add_event(
                "tick",
                0,
                0,
                &[KeyValue::string("payload", "0123456789abcdef")],
            );
            match result {
                Ok(()) => accepted += 1,
                Err(Error::Allocation) => break,
                Err(e) => return Err(e),
            }
        }

        // The rejected event left the buffer untouched; everything accepted
        // so far is still a complete, deliverable message.
        println!("  Accepted {accepted} events, {} of 96 bytes used", update.used());
    }

    // Example 3: typed values
    println!("\n3. All value types:");
    {
        let mut update = UpdateEncoder::new(GrowableBuffer::new(), 1, "sensor")?;
        update.add_event(
            "reading",
            0,
            0,
            &[
                KeyValue::string("unit", "celsius"),
                KeyValue::int32("raw", -12),
                KeyValue::int64("uptime_ms", 86_400_000_000),
                KeyValue::float("value", 21.5),
                KeyValue::double("calibration", 1.000_000_3),
            ],
        )?;

        let bytes = update.into_buffer().into_vec();
        println!("  Encoded {} bytes", bytes.len());
        println!("  {}", hex_dump(&bytes));
    }

    println!("\nAll examples completed successfully!");
    Ok(())
}
