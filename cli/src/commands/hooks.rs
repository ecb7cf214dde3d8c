use frontend_common::HOOKS;

pub fn handle_hooks() {
    for (name, hook) in HOOKS {
        println!("{:<28} {:?}", name, hook);
    }
}
