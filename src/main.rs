use looper::error::AppResult;

fn main() -> AppResult<()> {
    looper::run()
}
