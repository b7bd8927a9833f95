/// Generates a synthetic three-part exam with the given number of
/// questions per part.
pub fn generate_exam(per_part: usize) -> String {
    let mut out = String::new();
    let mut n = 0usize;

    out.push_str("PHẦN I. Câu trắc nghiệm nhiều phương án lựa chọn\n");
    for _ in 0..per_part {
        n += 1;
        out.push_str(&format!("Câu {n}. Nội dung câu hỏi số {n}?\n"));
        out.push_str("A. Phương án một\nB. Phương án hai\n*C. Phương án ba\nD. Phương án bốn\n");
    }

    out.push_str("PHẦN II. Câu trắc nghiệm đúng sai\n");
    for _ in 0..per_part {
        n += 1;
        out.push_str(&format!("Câu {n}. Xét các khẳng định sau:\n"));
        out.push_str("a) Khẳng định một *b) Khẳng định hai\nc) Khẳng định ba d) Khẳng định bốn\n");
    }

    out.push_str("PHẦN III. Câu trắc nghiệm trả lời ngắn\n");
    for _ in 0..per_part {
        n += 1;
        out.push_str(&format!("Câu {n}. Tính giá trị biểu thức số {n}.\n"));
        out.push_str(&format!("Đáp án: {n}\n"));
    }

    out.push_str("----- HẾT -----\n");
    out
}
